//! String interpolation of generated parts.

use crate::arbitrary::{Arbitrary, Generate};
use crate::error::FactoryError;
use std::fmt::Display;

const PLACEHOLDER: &str = "{}";

/// Fill each `{}` of `template` with the string form of one part.
///
/// Every part receives the caller's source. Parts of different types can
/// be mixed by converting them with [`Generate::stringify`] first.
pub fn compose<I, G>(template: &str, parts: I) -> Result<Arbitrary<String>, FactoryError>
where
    I: IntoIterator<Item = G>,
    G: Generate,
    G::Output: Display,
{
    let literals: Vec<String> = template.split(PLACEHOLDER).map(str::to_string).collect();
    let parts: Vec<Arbitrary<G::Output>> = parts.into_iter().map(|p| p.to_arbitrary()).collect();

    let placeholders = literals.len() - 1;
    if placeholders != parts.len() {
        return Err(FactoryError::TemplateMismatch {
            placeholders,
            parts: parts.len(),
        });
    }

    Ok(Arbitrary::from_source_fn(move |source| {
        let mut result = literals[0].clone();
        for (part, literal) in parts.iter().zip(&literals[1..]) {
            result.push_str(&part.invoke(source).to_string());
            result.push_str(literal);
        }
        result
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{pick, take};
    use crate::random::Gaussian;
    use arbitrary_core::Value;

    #[test]
    fn test_compose_profile() {
        let age = Gaussian::new(35.0, 10.0, Some(1234))
            .unwrap()
            .map(|x| x.floor() as i64);
        let name = pick(
            vec![Value::from("John"), Value::from("Jane")],
            Some(1234),
        );
        let hobby = take(2_usize, vec![Value::from("reading"), Value::from("coding")], None);

        let profile = compose(
            "{} is {} years old and likes {}",
            [name.stringify(), age.stringify(), hobby.stringify()],
        )
        .unwrap();

        for line in profile.sample(10) {
            assert!(line.starts_with("John is ") || line.starts_with("Jane is "));
            assert!(line.contains(" years old and likes "));
            assert!(line.ends_with("reading,coding") || line.ends_with("coding,reading"));
        }
    }

    #[test]
    fn test_compose_without_placeholders() {
        let fixed = compose("hello", Vec::<Arbitrary<i32>>::new()).unwrap();
        assert_eq!(fixed.call(), "hello");
    }

    #[test]
    fn test_compose_passes_source() {
        let echo = Arbitrary::from_source_fn(|source: Option<&crate::Source>| {
            source.map_or(-1.0, |s| s.call())
        });
        let line = compose("<{}|{}>", [echo.clone(), echo]).unwrap();
        let source = Arbitrary::constant(0.5);

        assert_eq!(line.call(), "<-1|-1>");
        assert_eq!(line.invoke(Some(&source)), "<0.5|0.5>");
    }

    #[test]
    fn test_compose_mismatch() {
        let result = compose("{} and {}", [Arbitrary::constant(1)]);
        assert!(matches!(
            result,
            Err(FactoryError::TemplateMismatch {
                placeholders: 2,
                parts: 1
            })
        ));
    }
}
