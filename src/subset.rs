//! Subset states: boolean masks over dataset entries
//!
//! A subset never removes entries. Writers use the mask to replace
//! excluded entries with NaN so the exported grid keeps its shape.

use crate::error::{SciportError, SciportResult};
use crate::types::{ComponentId, Dataset};
use regex::Regex;
use std::fmt;
use std::sync::OnceLock;

/// Comparison operator for inequality subsets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl Comparison {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "<" => Some(Comparison::Lt),
            "<=" => Some(Comparison::Le),
            ">" => Some(Comparison::Gt),
            ">=" => Some(Comparison::Ge),
            "==" => Some(Comparison::Eq),
            "!=" => Some(Comparison::Ne),
            _ => None,
        }
    }

    /// NaN on either side never matches, including for `!=`
    pub fn apply(self, lhs: f64, rhs: f64) -> bool {
        if lhs.is_nan() || rhs.is_nan() {
            return false;
        }
        match self {
            Comparison::Lt => lhs < rhs,
            Comparison::Le => lhs <= rhs,
            Comparison::Gt => lhs > rhs,
            Comparison::Ge => lhs >= rhs,
            Comparison::Eq => lhs == rhs,
            Comparison::Ne => lhs != rhs,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Comparison::Lt => "<",
            Comparison::Le => "<=",
            Comparison::Gt => ">",
            Comparison::Ge => ">=",
            Comparison::Eq => "==",
            Comparison::Ne => "!=",
        }
    }
}

/// Rule selecting which entries of a dataset belong to a subset
#[derive(Debug, Clone, PartialEq)]
pub enum SubsetState {
    Everything,
    Nothing,
    Inequality {
        component: ComponentId,
        op: Comparison,
        value: f64,
    },
    /// Inclusive on both ends
    Range {
        component: ComponentId,
        lo: f64,
        hi: f64,
    },
    /// Text membership
    Category {
        component: ComponentId,
        values: Vec<String>,
    },
    Mask(Vec<bool>),
    And(Box<SubsetState>, Box<SubsetState>),
    Or(Box<SubsetState>, Box<SubsetState>),
    Xor(Box<SubsetState>, Box<SubsetState>),
    Not(Box<SubsetState>),
}

impl SubsetState {
    pub fn inequality(component: impl Into<ComponentId>, op: Comparison, value: f64) -> Self {
        SubsetState::Inequality {
            component: component.into(),
            op,
            value,
        }
    }

    pub fn range(component: impl Into<ComponentId>, lo: f64, hi: f64) -> Self {
        SubsetState::Range {
            component: component.into(),
            lo,
            hi,
        }
    }

    pub fn and(self, other: SubsetState) -> Self {
        SubsetState::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: SubsetState) -> Self {
        SubsetState::Or(Box::new(self), Box::new(other))
    }

    pub fn xor(self, other: SubsetState) -> Self {
        SubsetState::Xor(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        SubsetState::Not(Box::new(self))
    }

    /// Evaluate the state against a dataset, one flag per entry
    pub fn to_mask(&self, data: &Dataset) -> SciportResult<Vec<bool>> {
        let size = data.size();
        match self {
            SubsetState::Everything => Ok(vec![true; size]),
            SubsetState::Nothing => Ok(vec![false; size]),
            SubsetState::Inequality {
                component,
                op,
                value,
            } => {
                let values = numeric_values(data, component)?;
                Ok(values.iter().map(|v| op.apply(*v, *value)).collect())
            }
            SubsetState::Range { component, lo, hi } => {
                let values = numeric_values(data, component)?;
                Ok(values.iter().map(|v| *v >= *lo && *v <= *hi).collect())
            }
            SubsetState::Category { component, values } => {
                let column = data.values(component.label())?.as_text().ok_or_else(|| {
                    SciportError::Subset(format!(
                        "component '{}' is not categorical",
                        component
                    ))
                })?;
                Ok(column.iter().map(|v| values.contains(v)).collect())
            }
            SubsetState::Mask(mask) => {
                if mask.len() != size {
                    return Err(SciportError::Subset(format!(
                        "mask has {} entries but dataset '{}' has {}",
                        mask.len(),
                        data.label,
                        size
                    )));
                }
                Ok(mask.clone())
            }
            SubsetState::And(a, b) => combine(data, a, b, |x, y| x && y),
            SubsetState::Or(a, b) => combine(data, a, b, |x, y| x || y),
            SubsetState::Xor(a, b) => combine(data, a, b, |x, y| x ^ y),
            SubsetState::Not(inner) => Ok(inner.to_mask(data)?.into_iter().map(|x| !x).collect()),
        }
    }

    /// Parse an expression such as `x > 2 & ~y == 4 | 'flux density' <= 1e-3`.
    ///
    /// Clauses are `name op number`, optionally negated with a leading `~`.
    /// Names containing spaces or operator characters can be single-quoted.
    /// `&` and `|` combine clauses strictly left to right.
    pub fn parse(expr: &str) -> SciportResult<Self> {
        let mut state: Option<SubsetState> = None;
        let mut pending: Option<char> = None;
        let mut clause = String::new();
        let mut in_quotes = false;

        for ch in expr.chars().chain(std::iter::once('\0')) {
            if ch == '\'' {
                in_quotes = !in_quotes;
            }
            let boundary = !in_quotes && matches!(ch, '&' | '|' | '\0');
            if !boundary {
                clause.push(ch);
                continue;
            }

            let parsed = parse_clause(&clause)?;
            state = Some(match (state, pending) {
                (None, _) => parsed,
                (Some(prev), Some('&')) => prev.and(parsed),
                (Some(prev), _) => prev.or(parsed),
            });
            pending = Some(ch);
            clause.clear();
        }

        if in_quotes {
            return Err(SciportError::Subset(format!("unbalanced quote in '{}'", expr)));
        }
        state.ok_or_else(|| SciportError::Subset("empty expression".to_string()))
    }
}

impl fmt::Display for SubsetState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SubsetState::Everything => write!(f, "everything"),
            SubsetState::Nothing => write!(f, "nothing"),
            SubsetState::Inequality {
                component,
                op,
                value,
            } => write!(f, "{} {} {}", component, op.symbol(), value),
            SubsetState::Range { component, lo, hi } => {
                write!(f, "{} <= {} <= {}", lo, component, hi)
            }
            SubsetState::Category { component, values } => {
                write!(f, "{} in {:?}", component, values)
            }
            SubsetState::Mask(mask) => {
                write!(f, "mask({}/{})", mask.iter().filter(|m| **m).count(), mask.len())
            }
            SubsetState::And(a, b) => write!(f, "({} & {})", a, b),
            SubsetState::Or(a, b) => write!(f, "({} | {})", a, b),
            SubsetState::Xor(a, b) => write!(f, "({} ^ {})", a, b),
            SubsetState::Not(inner) => write!(f, "~{}", inner),
        }
    }
}

fn numeric_values<'a>(data: &'a Dataset, component: &ComponentId) -> SciportResult<&'a [f64]> {
    data.values(component.label())?.as_numeric().ok_or_else(|| {
        SciportError::Subset(format!("component '{}' is not numeric", component))
    })
}

fn combine(
    data: &Dataset,
    a: &SubsetState,
    b: &SubsetState,
    op: impl Fn(bool, bool) -> bool,
) -> SciportResult<Vec<bool>> {
    let left = a.to_mask(data)?;
    let right = b.to_mask(data)?;
    Ok(left.into_iter().zip(right).map(|(x, y)| op(x, y)).collect())
}

fn clause_regex() -> &'static Regex {
    static CLAUSE: OnceLock<Regex> = OnceLock::new();
    CLAUSE.get_or_init(|| {
        Regex::new(r"^\s*(~)?\s*(?:'([^']*)'|([^<>=!~'\s][^<>=!']*?))\s*(<=|>=|==|!=|<|>)\s*(\S+)\s*$")
            .expect("clause regex is valid")
    })
}

fn parse_clause(clause: &str) -> SciportResult<SubsetState> {
    let caps = clause_regex()
        .captures(clause)
        .ok_or_else(|| SciportError::Subset(format!("cannot parse clause '{}'", clause.trim())))?;

    let name = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().trim())
        .unwrap_or_default();
    let op = Comparison::parse(&caps[4])
        .ok_or_else(|| SciportError::Subset(format!("unknown operator '{}'", &caps[4])))?;
    let value: f64 = caps[5]
        .parse()
        .map_err(|_| SciportError::Subset(format!("'{}' is not a number", &caps[5])))?;

    let state = SubsetState::inequality(name, op, value);
    Ok(if caps.get(1).is_some() { state.not() } else { state })
}

/// A labelled subset state
#[derive(Debug, Clone, PartialEq)]
pub struct Subset {
    pub label: String,
    pub state: SubsetState,
}

impl Subset {
    pub fn new(label: impl Into<String>, state: SubsetState) -> Self {
        Self {
            label: label.into(),
            state,
        }
    }

    pub fn to_mask(&self, data: &Dataset) -> SciportResult<Vec<bool>> {
        self.state.to_mask(data)
    }

    /// Number of entries of `data` inside the subset
    pub fn count(&self, data: &Dataset) -> SciportResult<usize> {
        Ok(self.to_mask(data)?.into_iter().filter(|m| *m).count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Component;

    fn data() -> Dataset {
        let mut d = Dataset::from_arrays(
            "test",
            vec![2, 3],
            [
                ("x", vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0]),
                ("y", vec![0.0, 2.0, f64::NAN, 6.0, 8.0, 10.0]),
            ],
        )
        .unwrap();
        d.add_component(
            "label",
            Component::new(vec!["a", "b", "a", "c", "b", "a"]),
        )
        .unwrap();
        d
    }

    #[test]
    fn test_inequality_mask() {
        let mask = SubsetState::inequality("x", Comparison::Gt, 2.0)
            .to_mask(&data())
            .unwrap();
        assert_eq!(mask, vec![false, false, false, true, true, true]);
    }

    #[test]
    fn test_nan_never_matches() {
        let d = data();
        let ne = SubsetState::inequality("y", Comparison::Ne, 1.0).to_mask(&d).unwrap();
        assert!(!ne[2]);
        let range = SubsetState::range("y", -1.0, 100.0).to_mask(&d).unwrap();
        assert!(!range[2]);
        assert!(range[5]);
    }

    #[test]
    fn test_combinators() {
        let d = data();
        let gt = SubsetState::inequality("x", Comparison::Gt, 1.0);
        let lt = SubsetState::inequality("x", Comparison::Lt, 4.0);
        assert_eq!(
            gt.clone().and(lt.clone()).to_mask(&d).unwrap(),
            vec![false, false, true, true, false, false]
        );
        assert_eq!(
            gt.clone().xor(lt).to_mask(&d).unwrap(),
            vec![true, true, false, false, true, true]
        );
        assert_eq!(
            gt.not().to_mask(&d).unwrap(),
            vec![true, true, false, false, false, false]
        );
    }

    #[test]
    fn test_category_state() {
        let state = SubsetState::Category {
            component: "label".into(),
            values: vec!["a".to_string()],
        };
        assert_eq!(
            state.to_mask(&data()).unwrap(),
            vec![true, false, true, false, false, true]
        );
    }

    #[test]
    fn test_kind_mismatch_errors() {
        let d = data();
        assert!(SubsetState::inequality("label", Comparison::Gt, 1.0)
            .to_mask(&d)
            .is_err());
        assert!(SubsetState::inequality("nope", Comparison::Gt, 1.0)
            .to_mask(&d)
            .is_err());
        assert!(SubsetState::Mask(vec![true]).to_mask(&d).is_err());
    }

    #[test]
    fn test_parse_single_clause() {
        let state = SubsetState::parse("x > 2").unwrap();
        assert_eq!(state, SubsetState::inequality("x", Comparison::Gt, 2.0));
    }

    #[test]
    fn test_parse_left_to_right() {
        let state = SubsetState::parse("x >= 1 & x < 4 | ~y == 0").unwrap();
        let expected = SubsetState::inequality("x", Comparison::Ge, 1.0)
            .and(SubsetState::inequality("x", Comparison::Lt, 4.0))
            .or(SubsetState::inequality("y", Comparison::Eq, 0.0).not());
        assert_eq!(state, expected);
    }

    #[test]
    fn test_parse_quoted_name() {
        let state = SubsetState::parse("'flux | err' <= 1e-3").unwrap();
        assert_eq!(
            state,
            SubsetState::inequality("flux | err", Comparison::Le, 1e-3)
        );
        let numeric_name = SubsetState::parse("1 != 3").unwrap();
        assert_eq!(numeric_name, SubsetState::inequality("1", Comparison::Ne, 3.0));
    }

    #[test]
    fn test_parse_errors() {
        assert!(SubsetState::parse("").is_err());
        assert!(SubsetState::parse("x >").is_err());
        assert!(SubsetState::parse("x > abc").is_err());
        assert!(SubsetState::parse("'x > 1").is_err());
    }

    #[test]
    fn test_subset_count() {
        let subset = Subset::new("big", SubsetState::parse("x > 2").unwrap());
        assert_eq!(subset.count(&data()).unwrap(), 3);
    }
}
