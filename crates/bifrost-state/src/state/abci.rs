//! The ABCI 2.0 lifecycle of the state machine, one method per consensus request.

use super::*;

mod deliver_tx;
mod extend_vote;
mod finalize_block;
mod init_chain;
mod prepare_proposal;
mod process_proposal;
mod verify_vote_extension;
