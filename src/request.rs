//! Page selection from request parameters
//!
//! Precedence: continuation token, then page number, then offset.

use crate::config::{PagerConfig, ParamNames};
use crate::error::Result;
use crate::selector::{PageNumber, PageOffset, PageSelector};
use crate::token::{is_valid, ContinuationToken};
use crate::types::StringMap;
use tracing::debug;

fn non_empty<'a>(params: &'a StringMap, name: &str) -> Option<&'a str> {
    params
        .get(name)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn integer(params: &StringMap, name: &str) -> Option<i64> {
    non_empty(params, name).and_then(|value| value.parse::<i64>().ok())
}

/// Build a selector from query parameters.
///
/// A `continue` value that fails the cheap shape check is ignored; one that
/// passes it but does not parse is an `InvalidToken` error. Non-numeric page
/// and offset values are ignored.
pub fn selector_from_query(params: &StringMap, names: &ParamNames) -> Result<PageSelector> {
    if let Some(raw) = non_empty(params, &names.continue_token) {
        if is_valid(raw) {
            return ContinuationToken::parse(raw).map(PageSelector::Token);
        }
        debug!(token = raw, "Ignoring malformed continuation token");
    }

    if let Some(number) = integer(params, &names.page) {
        return PageNumber::new(number).map(PageSelector::PageNumber);
    }

    if let Some(offset) = integer(params, &names.offset) {
        return PageOffset::new(offset).map(PageSelector::PageOffset);
    }

    Ok(PageSelector::None)
}

/// Page size from the `limit` parameter, or the configured default,
/// clamped to the configured maximum
pub fn page_size_from_query(params: &StringMap, config: &PagerConfig) -> usize {
    let requested = non_empty(params, &config.params.limit)
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(config.page_size);
    config.clamp_page_size(requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn query(pairs: &[(&str, &str)]) -> StringMap {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_no_params() {
        let selector = selector_from_query(&StringMap::new(), &ParamNames::default()).unwrap();
        assert_eq!(selector, PageSelector::None);
    }

    #[test]
    fn test_token_wins() {
        let params = query(&[("continue", "bfdew0_1_1jvdwz4"), ("page", "3"), ("offset", "9")]);
        let selector = selector_from_query(&params, &ParamNames::default()).unwrap();
        assert_eq!(selector.token().map(|t| t.offset()), Some(1));
    }

    #[test]
    fn test_malformed_token_is_ignored() {
        let params = query(&[("continue", "not-a-token"), ("page", "2")]);
        let selector = selector_from_query(&params, &ParamNames::default()).unwrap();
        assert_eq!(selector, PageSelector::PageNumber(PageNumber::new(2).unwrap()));
    }

    #[test]
    fn test_unparseable_token_is_an_error() {
        let params = query(&[("continue", "bfdew0_0_1jvdwz4")]);
        let err = selector_from_query(&params, &ParamNames::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidToken { .. }));
        assert!(err.is_client_error());
    }

    #[test_case("page", "0" ; "page zero")]
    #[test_case("page", "-2" ; "negative page")]
    #[test_case("offset", "-1" ; "negative offset")]
    fn test_out_of_range_positions(name: &str, value: &str) {
        let err = selector_from_query(&query(&[(name, value)]), &ParamNames::default()).unwrap_err();
        assert!(matches!(err, Error::InvalidArgument { .. }));
    }

    #[test]
    fn test_offset_selector() {
        let params = query(&[("offset", "0"), ("page", "abc")]);
        let selector = selector_from_query(&params, &ParamNames::default()).unwrap();
        assert_eq!(selector, PageSelector::PageOffset(PageOffset::new(0).unwrap()));
    }

    #[test]
    fn test_custom_param_names() {
        let names = ParamNames {
            continue_token: "cursor".to_string(),
            ..ParamNames::default()
        };
        let params = query(&[("cursor", "bfdew0_1_1jvdwz4")]);
        assert!(selector_from_query(&params, &names).unwrap().token().is_some());

        let ignored = query(&[("continue", "bfdew0_1_1jvdwz4")]);
        assert_eq!(selector_from_query(&ignored, &names).unwrap(), PageSelector::None);
    }

    #[test_case(&[], 10 ; "default")]
    #[test_case(&[("limit", "3")], 3 ; "explicit")]
    #[test_case(&[("limit", "0")], 0 ; "zero")]
    #[test_case(&[("limit", "5000")], 100 ; "clamped")]
    #[test_case(&[("limit", "lots")], 10 ; "non numeric")]
    fn test_page_size_from_query(pairs: &[(&str, &str)], expected: usize) {
        assert_eq!(page_size_from_query(&query(pairs), &PagerConfig::default()), expected);
    }
}
