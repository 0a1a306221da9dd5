//! Script host collaborator
//!
//! The scripting language runs behind [`ScriptHost`]. During play the engine
//! calls [`UPDATE_FUNCTION`] once per frame on every entity that has a script
//! bound; a failure ends the play session instead of propagating.

use thiserror::Error;

use crate::scene::{ObjectId, SceneObject};

/// Function invoked once per frame on scripted entities
pub const UPDATE_FUNCTION: &str = "update";

/// Script invocation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScriptError {
    /// Script file could not be loaded or compiled
    #[error("Failed to load script {path}: {reason}")]
    Load {
        /// Script path
        path: String,
        /// Host-specific reason
        reason: String,
    },

    /// Script has no function with this name
    #[error("Script function `{0}` not found")]
    MissingFunction(String),

    /// The function raised an error while running
    #[error("Script error on {id}: {message}")]
    Runtime {
        /// Object the script ran on
        id: ObjectId,
        /// Host-specific message
        message: String,
    },
}

/// Sandboxed callback host
pub trait ScriptHost {
    /// Call `function` in the script bound to `object`
    fn invoke(&mut self, object: &SceneObject, function: &str) -> Result<(), ScriptError>;
}
