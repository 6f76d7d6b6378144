//! Tool dispatch — mapping one model-issued invocation to an envelope.
//!
//! Whatever happens inside the tool, the caller gets back a
//! [`ToolResponse`] envelope: success text, a conversational
//! `"Error: ..."` string, or the unknown-function error. Nothing thrown
//! by a tool crosses this boundary.

use burrow_core::error::ToolError;
use burrow_core::message::{ToolCall, ToolResponse};
use burrow_core::tool::ToolRegistry;
use tracing::{debug, warn};

/// Dispatch a single tool call against the registry.
///
/// The workspace root is already bound into every registered tool — the
/// model supplies only the tool name and its relative-path arguments,
/// never the root. With `verbose`, the call and its result are echoed to
/// stdout as a diagnostic side effect.
pub async fn dispatch(call: &ToolCall, tools: &ToolRegistry, verbose: bool) -> ToolResponse {
    if verbose {
        println!(" - Calling function: {}({})", call.name, call.arguments);
    } else {
        debug!(tool = %call.name, "Dispatching tool call");
    }

    let output = match tools.execute(call).await {
        Ok(result) => {
            if !result.success {
                warn!(tool = %call.name, "Tool reported an error result");
            }
            result.output
        }
        // Structural failures stay conversational too: the model must be
        // able to see its own bad tool name or arguments and recover.
        Err(ToolError::NotFound(name)) => {
            warn!(tool = %name, "Unknown function requested");
            format!("Error: Unknown function: {name}")
        }
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Invalid tool invocation");
            format!("Error: {e}")
        }
    };

    if verbose {
        println!("-> {output}");
    }

    ToolResponse {
        name: call.name.clone(),
        output,
    }
}
