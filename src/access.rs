//! Gateway token authorization and group-chat access gating.
//!
//! All checks fail closed: an empty token always denies, an ambiguous IP
//! never matches. Callers reject unauthorized requests without detail about
//! which check failed, so denial replies leak no policy.

use crate::ChatKind;
use std::collections::HashSet;

/// Validate a shared-secret gateway token, optionally pinned to an IP
/// allowlist.
///
/// The token compare is an exact string match. A timing-safe comparison is a
/// known hardening gap here; the token is a coarse shared secret, not a
/// per-user credential.
pub fn authorize_gateway_token(
    token: &str,
    expected_token: &str,
    allowlist: Option<&str>,
    client_ip: Option<&str>,
) -> bool {
    if token.is_empty() || expected_token.is_empty() {
        return false;
    }
    if token != expected_token {
        return false;
    }

    let entries: Vec<&str> = allowlist
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .collect();

    if entries.is_empty() {
        return true;
    }

    let Some(client_ip) = client_ip else {
        tracing::warn!("gateway request rejected: allowlist configured but no client IP");
        return false;
    };

    entries.contains(&client_ip)
}

/// Whether the bot may operate in this chat at all.
///
/// Non-group chats are always allowed; an empty allowed set means every
/// group is allowed.
pub fn is_group_allowed(kind: ChatKind, chat_id: &str, allowed_groups: &HashSet<String>) -> bool {
    if !kind.is_group() || allowed_groups.is_empty() {
        return true;
    }
    allowed_groups.contains(chat_id)
}

/// Whether a denied request deserves an explicit denial reply.
///
/// Always reply in non-group chats. In groups, reply only when the bot was
/// mentioned or is the target of a reply, so unrelated group traffic never
/// triggers denial spam.
pub fn should_reply_access_denied(kind: ChatKind, bot_mentioned: bool, reply_to_bot: bool) -> bool {
    if !kind.is_group() {
        return true;
    }
    bot_mentioned || reply_to_bot
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_token_always_denies() {
        assert!(!authorize_gateway_token("", "secret", None, None));
        assert!(!authorize_gateway_token("secret", "", None, None));
    }

    #[test]
    fn mismatched_token_denies() {
        assert!(!authorize_gateway_token("wrong", "secret", None, None));
    }

    #[test]
    fn matching_token_without_allowlist_grants() {
        assert!(authorize_gateway_token("secret", "secret", None, None));
        // A blank allowlist behaves as absent.
        assert!(authorize_gateway_token("secret", "secret", Some("  "), None));
    }

    #[test]
    fn allowlist_requires_caller_ip_membership() {
        let allowlist = Some("10.0.0.1, 192.168.1.5");

        assert!(authorize_gateway_token("secret", "secret", allowlist, Some("192.168.1.5")));
        assert!(!authorize_gateway_token("secret", "secret", allowlist, Some("192.168.1.6")));
        assert!(!authorize_gateway_token("secret", "secret", allowlist, None));
    }

    #[test]
    fn non_group_chats_are_never_gated() {
        let allowed: HashSet<String> = ["-100123".to_string()].into();

        assert!(is_group_allowed(ChatKind::Private, "55", &allowed));
        assert!(is_group_allowed(ChatKind::Channel, "55", &allowed));
    }

    #[test]
    fn empty_allowed_set_admits_every_group() {
        assert!(is_group_allowed(ChatKind::Group, "-100123", &HashSet::new()));
    }

    #[test]
    fn group_membership_is_exact() {
        let allowed: HashSet<String> = ["-100123".to_string()].into();

        assert!(is_group_allowed(ChatKind::Group, "-100123", &allowed));
        assert!(is_group_allowed(ChatKind::Supergroup, "-100123", &allowed));
        assert!(!is_group_allowed(ChatKind::Group, "-100999", &allowed));
    }

    #[test]
    fn denial_replies_go_to_direct_chats_and_addressed_group_messages() {
        assert!(should_reply_access_denied(ChatKind::Private, false, false));
        assert!(should_reply_access_denied(ChatKind::Group, true, false));
        assert!(should_reply_access_denied(ChatKind::Group, false, true));
        assert!(!should_reply_access_denied(ChatKind::Group, false, false));
    }
}
