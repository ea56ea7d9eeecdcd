use super::*;

impl<S: StateReadExt + 'static> State<S> {
    /// Check another validator's vote extension before counting its precommit.
    pub async fn verify_vote_extension(
        &self,
        request: request::VerifyVoteExtension,
    ) -> Result<response::VerifyVoteExtension, Report> {
        match sidetx::verify_vote_extension(
            request.height,
            request.hash.as_bytes(),
            &request.vote_extension,
        ) {
            Ok(_) => Ok(response::VerifyVoteExtension::Accept),
            Err(e) => {
                warn!(
                    validator = %request.validator_address,
                    height = %request.height,
                    %e,
                    "rejecting vote extension"
                );
                Ok(response::VerifyVoteExtension::Reject)
            }
        }
    }
}
