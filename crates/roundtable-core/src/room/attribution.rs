//! After-the-fact attribution of generated replies.
//!
//! The message log stores no foreign key from a reply to the role that
//! produced it. Because the orchestrator persists replies in address
//! order, attribution can be reconstructed: walk back from a generated
//! message to the nearest preceding human message, resolve its address
//! tokens, and index into them by how many generated messages sit in
//! between.

use roundtable_types::message::{AuthorKind, Message};

use crate::mention::{parse_mentions, resolve_mentions};

/// For each message, the role it is attributed to.
///
/// Human messages and generated messages with no attributable origin
/// (no preceding human message, or one that addressed nobody) map to
/// `None`. The function is pure: running it twice over the same log
/// yields identical output.
pub fn attribute_generated(messages: &[Message], known_roles: &[String]) -> Vec<Option<String>> {
    let mut out = Vec::with_capacity(messages.len());

    for (i, message) in messages.iter().enumerate() {
        if message.author != AuthorKind::Generated {
            out.push(None);
            continue;
        }

        // Nearest preceding human message, counting generated messages
        // in between.
        let mut k = 0usize;
        let mut origin: Option<&Message> = None;
        for earlier in messages[..i].iter().rev() {
            match earlier.author {
                AuthorKind::Human => {
                    origin = Some(earlier);
                    break;
                }
                AuthorKind::Generated => k += 1,
            }
        }

        let Some(origin) = origin else {
            out.push(None);
            continue;
        };

        let tokens = resolve_mentions(&parse_mentions(&origin.content), known_roles);
        let attributed = if tokens.len() > k {
            Some(tokens[k].clone())
        } else {
            tokens.first().cloned()
        };
        out.push(attributed);
    }

    out
}
