//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter    | Implements         | Connects to                      |
//! |------------|--------------------|----------------------------------|
//! | `log_sink` | SnapshotSink       | `log` output                     |
//! | `sim`      | RadioPort          | In-memory radio state            |
//! |            | AccelerometerPort  | Background sample thread         |
//! |            | LocationPort       | Background fix thread            |
//! |            | SettingsPort       | Recorded hand-offs               |
//! |            | PermissionPort     | In-memory grant set              |

pub mod log_sink;
pub mod sim;
