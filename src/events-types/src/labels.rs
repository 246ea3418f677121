//!
//! # Label selectors
//!
//! Both the object form (`matchLabels`/`matchExpressions`) and the string
//! form used in list queries, e.g. `app=storage,tier notin (cache),!canary`.
//!
use std::collections::BTreeSet;
use std::collections::HashMap;
use std::convert::TryFrom;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum SelectorError {
    #[error("empty key in selector term: '{0}'")]
    EmptyKey(String),
    #[error("invalid key '{0}'")]
    InvalidKey(String),
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),
    #[error("unbalanced parentheses in '{0}'")]
    Unbalanced(String),
    #[error("unexpected '{0}' after value set")]
    TrailingText(String),
    #[error("invalid value '{0}'")]
    InvalidValue(String),
    #[error("operator {0} requires at least one value")]
    MissingValues(Operator),
    #[error("operator {0} takes no values")]
    UnexpectedValues(Operator),
}

#[derive(Deserialize, Serialize, Default, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelSelector {
    pub match_labels: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub match_expressions: Vec<LabelSelectorRequirement>,
}

impl LabelSelector {
    pub fn new_labels<T: Into<String>>(labels: Vec<(T, T)>) -> Self {
        let mut match_labels = HashMap::new();
        for (key, value) in labels {
            match_labels.insert(key.into(), value.into());
        }
        LabelSelector {
            match_labels,
            match_expressions: vec![],
        }
    }

    pub fn with_expression(mut self, requirement: LabelSelectorRequirement) -> Self {
        self.match_expressions.push(requirement);
        self
    }
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Clone)]
#[serde(rename_all = "camelCase")]
pub struct LabelSelectorRequirement {
    pub key: String,
    pub operator: LabelSelectorOperator,
    #[serde(default)]
    pub values: Vec<String>,
}

#[derive(Deserialize, Serialize, Debug, PartialEq, Eq, Clone, Copy)]
pub enum LabelSelectorOperator {
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Operator {
    Equals,
    NotEquals,
    In,
    NotIn,
    Exists,
    DoesNotExist,
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self {
            Self::Equals => "=",
            Self::NotEquals => "!=",
            Self::In => "in",
            Self::NotIn => "notin",
            Self::Exists => "exists",
            Self::DoesNotExist => "!",
        };
        write!(f, "{}", op)
    }
}

/// single term of a selector
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Requirement {
    key: String,
    operator: Operator,
    values: BTreeSet<String>,
}

impl Requirement {
    pub fn new<K, V>(key: K, operator: Operator, values: V) -> Result<Self, SelectorError>
    where
        K: Into<String>,
        V: IntoIterator,
        V::Item: Into<String>,
    {
        let key = key.into();
        validate_key(&key)?;
        let values: BTreeSet<String> = values.into_iter().map(Into::into).collect();
        match operator {
            Operator::Exists | Operator::DoesNotExist => {
                if !values.is_empty() {
                    return Err(SelectorError::UnexpectedValues(operator));
                }
            }
            Operator::Equals | Operator::NotEquals => {
                if values.len() != 1 {
                    return Err(SelectorError::MissingValues(operator));
                }
            }
            Operator::In | Operator::NotIn => {
                if values.is_empty() {
                    return Err(SelectorError::MissingValues(operator));
                }
            }
        }
        Ok(Self {
            key,
            operator,
            values,
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn operator(&self) -> Operator {
        self.operator
    }

    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        let value = labels.get(&self.key);
        match self.operator {
            Operator::Equals | Operator::In => {
                value.map_or(false, |value| self.values.contains(value))
            }
            // absent key satisfies inequality
            Operator::NotEquals | Operator::NotIn => {
                value.map_or(true, |value| !self.values.contains(value))
            }
            Operator::Exists => value.is_some(),
            Operator::DoesNotExist => value.is_none(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let values: Vec<&str> = self.values.iter().map(String::as_str).collect();
        match self.operator {
            Operator::Exists => write!(f, "{}", self.key),
            Operator::DoesNotExist => write!(f, "!{}", self.key),
            Operator::Equals | Operator::NotEquals => {
                write!(f, "{}{}{}", self.key, self.operator, values.join(""))
            }
            Operator::In | Operator::NotIn => {
                write!(f, "{} {} ({})", self.key, self.operator, values.join(","))
            }
        }
    }
}

/// Conjunction of requirements. An empty selector matches everything.
#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Selector {
    requirements: Vec<Requirement>,
}

impl Selector {
    pub fn everything() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn requirements(&self) -> &[Requirement] {
        &self.requirements
    }

    pub fn add(mut self, requirement: Requirement) -> Self {
        self.requirements.push(requirement);
        self
    }

    pub fn matches(&self, labels: &HashMap<String, String>) -> bool {
        self.requirements.iter().all(|req| req.matches(labels))
    }

    /// selector from simple equality pairs
    pub fn from_labels(labels: &HashMap<String, String>) -> Result<Self, SelectorError> {
        let mut keys: Vec<&String> = labels.keys().collect();
        keys.sort();
        let mut selector = Self::everything();
        for key in keys {
            selector = selector.add(Requirement::new(
                key.as_str(),
                Operator::Equals,
                vec![labels[key].as_str()],
            )?);
        }
        Ok(selector)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let terms: Vec<String> = self.requirements.iter().map(|r| r.to_string()).collect();
        write!(f, "{}", terms.join(","))
    }
}

impl FromStr for Selector {
    type Err = SelectorError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let mut selector = Self::everything();
        for term in split_terms(input)? {
            selector = selector.add(parse_term(term)?);
        }
        Ok(selector)
    }
}

impl TryFrom<&LabelSelector> for Selector {
    type Error = SelectorError;

    fn try_from(label_selector: &LabelSelector) -> Result<Self, Self::Error> {
        let mut selector = Self::from_labels(&label_selector.match_labels)?;
        for expr in &label_selector.match_expressions {
            let operator = match expr.operator {
                LabelSelectorOperator::In => Operator::In,
                LabelSelectorOperator::NotIn => Operator::NotIn,
                LabelSelectorOperator::Exists => Operator::Exists,
                LabelSelectorOperator::DoesNotExist => Operator::DoesNotExist,
            };
            selector = selector.add(Requirement::new(
                expr.key.as_str(),
                operator,
                expr.values.iter().map(String::as_str),
            )?);
        }
        Ok(selector)
    }
}

fn validate_key(key: &str) -> Result<(), SelectorError> {
    if key.is_empty() {
        return Err(SelectorError::EmptyKey(key.to_owned()));
    }
    if key.chars().any(|c| c.is_whitespace() || "=!(),".contains(c)) {
        return Err(SelectorError::InvalidKey(key.to_owned()));
    }
    Ok(())
}

/// values of the string form are plain tokens
fn validate_value(value: &str) -> Result<&str, SelectorError> {
    if value.chars().any(|c| c.is_whitespace() || "=!(),".contains(c)) {
        return Err(SelectorError::InvalidValue(value.to_owned()));
    }
    Ok(value)
}

/// split on commas outside of value sets
fn split_terms(input: &str) -> Result<Vec<&str>, SelectorError> {
    let mut terms = vec![];
    let mut depth = 0;
    let mut start = 0;
    for (idx, c) in input.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                if depth == 0 {
                    return Err(SelectorError::Unbalanced(input.to_owned()));
                }
                depth -= 1;
            }
            ',' if depth == 0 => {
                terms.push(&input[start..idx]);
                start = idx + 1;
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(SelectorError::Unbalanced(input.to_owned()));
    }
    terms.push(&input[start..]);
    Ok(terms
        .into_iter()
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .collect())
}

fn parse_term(term: &str) -> Result<Requirement, SelectorError> {
    if let Some(key) = term.strip_prefix('!') {
        return Requirement::new(key.trim(), Operator::DoesNotExist, Vec::<String>::new());
    }

    if let Some(open) = term.find('(') {
        let close = term
            .rfind(')')
            .ok_or_else(|| SelectorError::Unbalanced(term.to_owned()))?;
        let rest = term[close + 1..].trim();
        if !rest.is_empty() {
            return Err(SelectorError::TrailingText(rest.to_owned()));
        }
        let mut head = term[..open].split_whitespace();
        let key = head
            .next()
            .ok_or_else(|| SelectorError::EmptyKey(term.to_owned()))?;
        let operator = match head.next() {
            Some("in") => Operator::In,
            Some("notin") => Operator::NotIn,
            Some(other) => return Err(SelectorError::UnknownOperator(other.to_owned())),
            None => return Err(SelectorError::UnknownOperator(term.to_owned())),
        };
        if let Some(extra) = head.next() {
            return Err(SelectorError::UnknownOperator(extra.to_owned()));
        }
        let values = term[open + 1..close]
            .split(',')
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(validate_value)
            .collect::<Result<Vec<_>, _>>()?;
        return Requirement::new(key, operator, values);
    }

    let (key, operator, value) = if let Some((key, value)) = term.split_once("!=") {
        (key, Operator::NotEquals, value)
    } else if let Some((key, value)) = term.split_once("==") {
        (key, Operator::Equals, value)
    } else if let Some((key, value)) = term.split_once('=') {
        (key, Operator::Equals, value)
    } else {
        return Requirement::new(term, Operator::Exists, Vec::<String>::new());
    };
    Requirement::new(key.trim(), operator, vec![validate_value(value.trim())?])
}

#[cfg(test)]
mod test {

    use std::collections::HashMap;
    use std::convert::TryFrom;

    use super::LabelSelector;
    use super::LabelSelectorOperator;
    use super::LabelSelectorRequirement;
    use super::Operator;
    use super::Selector;
    use super::SelectorError;

    fn labels(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_empty_selector_matches_everything() {
        let selector: Selector = "".parse().expect("parse");
        assert!(selector.is_empty());
        assert!(selector.matches(&labels(&[])));
        assert!(selector.matches(&labels(&[("app", "gcs")])));
    }

    #[test]
    fn test_equality_terms() {
        let selector: Selector = "app=storage, env==prod".parse().expect("parse");
        assert_eq!(selector.requirements().len(), 2);
        assert!(selector.matches(&labels(&[("app", "storage"), ("env", "prod")])));
        assert!(!selector.matches(&labels(&[("app", "storage"), ("env", "dev")])));
        assert!(!selector.matches(&labels(&[("app", "storage")])));

        let selector: Selector = "env!=prod".parse().expect("parse");
        assert_eq!(selector.requirements()[0].operator(), Operator::NotEquals);
        assert!(selector.matches(&labels(&[])));
        assert!(!selector.matches(&labels(&[("env", "prod")])));
    }

    #[test]
    fn test_set_terms() {
        let selector: Selector = "tier in (cache, web),zone notin (us-east1)"
            .parse()
            .expect("parse");
        assert!(selector.matches(&labels(&[("tier", "web"), ("zone", "eu")])));
        assert!(!selector.matches(&labels(&[("tier", "db")])));
        assert!(!selector.matches(&labels(&[("tier", "cache"), ("zone", "us-east1")])));
        assert_eq!(
            selector.to_string(),
            "tier in (cache,web),zone notin (us-east1)"
        );
    }

    #[test]
    fn test_existence_terms() {
        let selector: Selector = "canary,!legacy".parse().expect("parse");
        assert!(selector.matches(&labels(&[("canary", "")])));
        assert!(!selector.matches(&labels(&[("canary", "1"), ("legacy", "1")])));
        assert!(!selector.matches(&labels(&[])));
    }

    #[test]
    fn test_invalid_selectors() {
        assert!(matches!(
            "tier in (a".parse::<Selector>(),
            Err(SelectorError::Unbalanced(_))
        ));
        assert!(matches!(
            "tier within (a)".parse::<Selector>(),
            Err(SelectorError::UnknownOperator(_))
        ));
        assert!(matches!(
            "=value".parse::<Selector>(),
            Err(SelectorError::EmptyKey(_))
        ));
        assert!(matches!(
            "tier in ()".parse::<Selector>(),
            Err(SelectorError::MissingValues(Operator::In))
        ));
    }

    #[test]
    fn test_rejects_text_after_value_set() {
        assert_eq!(
            "tier in (a) junk".parse::<Selector>(),
            Err(SelectorError::TrailingText("junk".to_owned()))
        );
        assert!(matches!(
            "tier in (a)(b)".parse::<Selector>(),
            Err(SelectorError::InvalidValue(_))
        ));
        assert!(matches!(
            "tier in extra (a)".parse::<Selector>(),
            Err(SelectorError::UnknownOperator(_))
        ));
        assert!("tier in (a) ,app=b".parse::<Selector>().is_ok());
    }

    #[test]
    fn test_rejects_separator_in_value() {
        assert_eq!(
            "a=b=c".parse::<Selector>(),
            Err(SelectorError::InvalidValue("b=c".to_owned()))
        );
        assert!(matches!(
            "a!=b=c".parse::<Selector>(),
            Err(SelectorError::InvalidValue(_))
        ));
        assert!(matches!(
            "a==b c".parse::<Selector>(),
            Err(SelectorError::InvalidValue(_))
        ));
        assert!("a=".parse::<Selector>().is_ok());
    }

    #[test]
    fn test_label_selector_object() {
        let object = LabelSelector::new_labels(vec![("app", "storage")]).with_expression(
            LabelSelectorRequirement {
                key: "tier".to_owned(),
                operator: LabelSelectorOperator::NotIn,
                values: vec!["cache".to_owned()],
            },
        );
        let selector = Selector::try_from(&object).expect("selector");
        assert!(selector.matches(&labels(&[("app", "storage")])));
        assert!(!selector.matches(&labels(&[("app", "storage"), ("tier", "cache")])));
        assert_eq!(selector.to_string(), "app=storage,tier notin (cache)");
    }
}
