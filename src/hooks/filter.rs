//! Filter matchers.
//!
//! Each filter kind gets its own matcher; a hook's filter object compiles to
//! the matchers for the predicates it declares, composed by logical AND.
//! New filter kinds add a matcher here without touching the dispatch core.

use crate::InboundEvent;
use crate::hooks::config::HookFilter;

/// A single filter predicate evaluated against an event.
pub trait FilterMatcher: Send + Sync {
    fn matches(&self, event: &InboundEvent) -> bool;
}

/// Substring containment over the event text. Absent text never matches.
pub struct TextIncludesMatcher {
    needle: String,
}

impl FilterMatcher for TextIncludesMatcher {
    fn matches(&self, event: &InboundEvent) -> bool {
        event
            .text
            .as_deref()
            .is_some_and(|text| text.contains(&self.needle))
    }
}

/// Exact equality over the event's tool name.
pub struct ToolNameMatcher {
    expected: String,
}

impl FilterMatcher for ToolNameMatcher {
    fn matches(&self, event: &InboundEvent) -> bool {
        event.tool_name.as_deref() == Some(self.expected.as_str())
    }
}

/// Inclusive numeric range over the event text length. Absent text counts
/// as length zero.
pub struct TextLenMatcher {
    min: Option<usize>,
    max: Option<usize>,
}

impl FilterMatcher for TextLenMatcher {
    fn matches(&self, event: &InboundEvent) -> bool {
        let len = event.text.as_deref().map_or(0, |text| text.chars().count());
        self.min.is_none_or(|min| len >= min) && self.max.is_none_or(|max| len <= max)
    }
}

/// Compile a filter object into the matchers for its declared predicates.
pub fn compile(filter: &HookFilter) -> Vec<Box<dyn FilterMatcher>> {
    let mut matchers: Vec<Box<dyn FilterMatcher>> = Vec::new();

    if let Some(needle) = &filter.text_includes {
        matchers.push(Box::new(TextIncludesMatcher {
            needle: needle.clone(),
        }));
    }
    if let Some(expected) = &filter.tool_name {
        matchers.push(Box::new(ToolNameMatcher {
            expected: expected.clone(),
        }));
    }
    if filter.min_text_len.is_some() || filter.max_text_len.is_some() {
        matchers.push(Box::new(TextLenMatcher {
            min: filter.min_text_len,
            max: filter.max_text_len,
        }));
    }

    matchers
}

/// AND over every declared predicate. A filter with no predicates matches
/// everything, same as no filter at all.
pub fn matches_event(filter: &HookFilter, event: &InboundEvent) -> bool {
    compile(filter).iter().all(|matcher| matcher.matches(event))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_includes_is_substring_containment() {
        let filter = HookFilter {
            text_includes: Some("report".to_string()),
            ..Default::default()
        };

        let hit = InboundEvent::new("message").with_text("please report");
        let miss = InboundEvent::new("message").with_text("please help");

        assert!(matches_event(&filter, &hit));
        assert!(!matches_event(&filter, &miss));
    }

    #[test]
    fn text_includes_never_matches_absent_text() {
        let filter = HookFilter {
            text_includes: Some("report".to_string()),
            ..Default::default()
        };

        assert!(!matches_event(&filter, &InboundEvent::new("message")));
    }

    #[test]
    fn tool_name_is_exact_equality() {
        let filter = HookFilter {
            tool_name: Some("search".to_string()),
            ..Default::default()
        };

        let hit = InboundEvent::new("tool_completed").with_tool_name("search");
        let near = InboundEvent::new("tool_completed").with_tool_name("search_web");

        assert!(matches_event(&filter, &hit));
        assert!(!matches_event(&filter, &near));
    }

    #[test]
    fn text_len_bounds_are_inclusive() {
        let filter = HookFilter {
            min_text_len: Some(5),
            max_text_len: Some(10),
            ..Default::default()
        };

        assert!(matches_event(&filter, &InboundEvent::new("message").with_text("12345")));
        assert!(matches_event(&filter, &InboundEvent::new("message").with_text("1234567890")));
        assert!(!matches_event(&filter, &InboundEvent::new("message").with_text("1234")));
        assert!(!matches_event(&filter, &InboundEvent::new("message").with_text("12345678901")));
    }

    #[test]
    fn predicates_compose_by_and() {
        let filter = HookFilter {
            text_includes: Some("deploy".to_string()),
            tool_name: Some("ci".to_string()),
            ..Default::default()
        };

        let both = InboundEvent::new("tool_completed")
            .with_text("deploy finished")
            .with_tool_name("ci");
        let text_only = InboundEvent::new("tool_completed").with_text("deploy finished");

        assert!(matches_event(&filter, &both));
        assert!(!matches_event(&filter, &text_only));
    }

    #[test]
    fn empty_filter_matches_everything() {
        assert!(matches_event(&HookFilter::default(), &InboundEvent::new("message")));
    }
}
