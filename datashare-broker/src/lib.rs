//! Data-sharing access broker.
//!
//! Mediates CRUD and metadata operations across process boundaries:
//! it resolves a logical resource URI to a concrete provider, enforces a
//! silent-proxy permission policy for proxy-mode callers, and fans out
//! change notifications to subscribed observers.
//!
//! # Components
//!
//! - **Resolver**: URI normalization/denormalization and authority → provider
//!   lookup
//! - **Gate**: per-(caller, uri) silent-proxy registrations consulted before
//!   every proxy-mode operation
//! - **Dispatcher**: argument validation, gating, provider delegation, and
//!   error wrapping for every operation
//! - **Hub**: `(change type, uri)` → observer registry with asynchronous,
//!   registration-ordered delivery
//! - **Session**: the per-consumer handle all of the above is reached through
//!
//! # Data flow
//!
//! A consumer asks the [`DataShareBroker`] for a [`Session`] bound to a
//! target URI (normal or proxy mode). Every operation on the session checks
//! the connected flag, then flows resolver → gate → provider, and successful
//! mutations fan out through the hub.
//!
//! # Example
//!
//! ```no_run
//! use datashare_broker::{CreateOptions, DataShareBroker};
//! use datashare_types::CallerId;
//!
//! # async fn demo(broker: DataShareBroker) -> datashare_broker::BrokerResult<()> {
//! let caller = CallerId::new();
//! let session = broker
//!     .create_helper(caller, "datashare://com.example.provider/entry/TBL00", CreateOptions::default())
//!     .await?;
//! session.disconnect();
//! # Ok(())
//! # }
//! ```

mod dispatcher;
mod error;
mod gate;
mod hub;
mod provider;
mod resolver;
mod session;

pub use dispatcher::{Dispatcher, OpContext};
pub use error::{BrokerError, BrokerResult};
pub use gate::{AccessKind, ProxyGate, ProxyState};
pub use hub::{ChangeCallback, ChangeHub};
pub use provider::{FileHandle, OpenMode, Provider, ProviderFailure, ProviderResult, ResultSet};
pub use resolver::UriResolver;
pub use session::{CreateOptions, DataShareBroker, Session};
