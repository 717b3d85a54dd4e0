//! Role context assembly.
//!
//! Builds the system-level instruction block for one role's model call.
//! Section order is a correctness requirement: identity and peer rules
//! come before the role's own prompt so a customized prompt cannot
//! silently override the addressing protocol.

use roundtable_types::ability::Ability;
use roundtable_types::role::Role;

/// Fallback instruction for roles with no prompt version yet.
const GENERIC_PROMPT: &str =
    "Answer the user's message helpfully and concisely, staying within your role.";

/// Assembles the instruction text injected into a role's model call.
pub struct RoleContextBuilder;

impl RoleContextBuilder {
    /// Build the system prompt for `role`.
    ///
    /// `peers` are the other roles addressed alongside this one;
    /// `latest_prompt` is the highest prompt version, if any;
    /// `abilities` are the resolved definitions of the role's bound
    /// ability identifiers.
    pub fn build(
        role: &Role,
        peers: &[String],
        latest_prompt: Option<&str>,
        abilities: &[Ability],
    ) -> String {
        let mut sections = Vec::new();

        let mut identity = format!("<identity>\nYou are the role \"{}\".", role.name);
        if !role.description.is_empty() {
            identity.push_str(&format!(" {}", role.description));
        }
        identity.push_str("\n</identity>");
        sections.push(identity);

        if !peers.is_empty() {
            let names = peers
                .iter()
                .map(|p| format!("@{p}"))
                .collect::<Vec<_>>()
                .join(", ");
            sections.push(format!(
                "<peers>\nOther roles in this conversation: {names}.\n\
                 To bring another role into the conversation you must write \
                 their address token verbatim (for example {first}) in your \
                 reply body. Natural-language references such as \"ask them \
                 to...\" do not count and will not trigger that role.\n</peers>",
                first = format!("@{}", peers[0]),
            ));
        }

        sections.push(format!(
            "<instructions>\n{}\n</instructions>",
            latest_prompt.unwrap_or(GENERIC_PROMPT)
        ));

        if !abilities.is_empty() {
            let mut list = String::from("<abilities>\nYou have these abilities:\n");
            for ability in abilities {
                list.push_str(&format!(
                    "- {} (id: {}): {}\n",
                    ability.name, ability.id, ability.description
                ));
            }
            list.push_str(
                "Invoke an ability only when the user's intent clearly calls \
                 for it; otherwise answer plainly.\n</abilities>",
            );
            sections.push(list);
        }

        sections.join("\n\n")
    }
}
