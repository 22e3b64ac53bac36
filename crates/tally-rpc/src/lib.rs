//! # tally-rpc
//!
//! JSON-RPC 2.0 server for the Tally voting ledger.
//!
//! Read methods are open to anyone. Mutating methods take a signed call
//! envelope; the signer's recovered address becomes the caller identity and
//! the server clock supplies the call timestamp.
//!
//! ## Usage
//!
//! ```ignore
//! use tally_rpc::{RpcServer, RpcHandler, RpcContext, ServerConfig};
//! use std::sync::Arc;
//!
//! let ctx = Arc::new(RpcContext::new(ledger, Arc::new(SystemClock)));
//! let handler = RpcHandler::new(ctx);
//! let server = RpcServer::new(ServerConfig::default(), handler);
//!
//! server.run().await?;
//! ```
//!
//! ## Supported Methods
//!
//! ### Reads
//!
//! | Method | Description |
//! |--------|-------------|
//! | `tally_admin` | Admin address |
//! | `tally_totalCandidates` | Number of indices ever allocated |
//! | `tally_getCandidate` | Candidate by index |
//! | `tally_listCandidates` | All candidates, including inactive |
//! | `tally_activeCandidates` | Candidates accepting votes |
//! | `tally_votingPeriod` | Current voting window |
//! | `tally_currentPhase` | Phase at the given or current time |
//! | `tally_voterStatus` | Whether an address voted, and for whom |
//! | `tally_totalVotes` | Number of identities that voted |
//! | `tally_stateVersion` | Version of the last mutation |
//! | `tally_snapshot` | Consistent view of the whole ledger |
//! | `tally_nonce` | Last nonce accepted from an address |
//! | `tally_clientVersion` | Server version string |
//!
//! ### Signed mutations
//!
//! | Method | Description |
//! |--------|-------------|
//! | `tally_addCandidate` | Register a candidate (admin) |
//! | `tally_deactivateCandidate` | Tombstone a candidate (admin) |
//! | `tally_setVotingPeriod` | Replace the voting window (admin) |
//! | `tally_vote` | Cast the signer's vote |

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod error;
pub mod handler;
pub mod methods;
pub mod server;
pub mod types;

pub use auth::{AuthError, Authenticator};
pub use error::{JsonRpcError, RpcError, RpcResult};
pub use handler::{MethodRegistry, RpcContext, RpcHandler};
pub use server::{RpcServer, ServerConfig};
pub use types::{JsonRpcId, JsonRpcRequest, JsonRpcResponse, SignedCallRaw};
