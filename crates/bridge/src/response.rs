use {
    hookrelay_common::EventKind,
    hookrelay_config::ChannelKind,
    serde::Serialize,
};

/// JSON the hook prints on stdout to feed a reply back to the agent host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum HookResponse {
    /// Keeps a stopping agent running with `reason` as its next input.
    Block {
        decision: &'static str,
        reason: String,
    },
    Context {
        #[serde(rename = "hookSpecificOutput")]
        hook_specific_output: HookSpecificOutput,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HookSpecificOutput {
    pub hook_event_name: String,
    pub additional_context: String,
}

impl HookResponse {
    pub fn for_reply(kind: &EventKind, channel: ChannelKind, reply: &str) -> Self {
        let message = format!("Human replied via {channel}: {reply}");
        if kind.is_stop() {
            Self::Block {
                decision: "block",
                reason: message,
            }
        } else {
            Self::Context {
                hook_specific_output: HookSpecificOutput {
                    hook_event_name: kind.to_string(),
                    additional_context: message,
                },
            }
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }
}
