//! Recipe definitions for the arbitrary-factory toolkit.
//!
//! A recipe is a YAML document describing a graph of generators. Named
//! generators declared under `generators` can be referenced from anywhere
//! in the graph with a `ref` node; every reference to the same name shares
//! one structural projection, so projected fields stay correlated.
//!
//! ```yaml
//! seed: 1234
//! generators:
//!   deck:
//!     type: shuffle
//!     pool: [A, K, Q, J, "10"]
//! output:
//!   type: compose
//!   template: "Your hand is {} and {}"
//!   parts:
//!     - { type: ref, name: deck, path: [0] }
//!     - { type: ref, name: deck, path: [1] }
//! ```

use crate::value::{Key, Value};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Error type for recipe loading.
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// Error reading recipe file
    #[error("Failed to read recipe file: {0}")]
    IoError(#[from] std::io::Error),

    /// Error parsing YAML
    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A `ref` node names a generator that is not declared
    #[error("Unknown generator referenced: {0}")]
    UnknownReference(String),
}

/// Numeric parameter: either a constant or a nested generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Param {
    /// Fixed number
    Number(f64),

    /// Generator re-evaluated on every draw
    Generator(Box<GeneratorConfig>),
}

/// Count parameter: either a fixed count or a nested generator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Count {
    /// Fixed count
    Fixed(usize),

    /// Generator evaluated once per invocation; its value is floored
    Generator(Box<GeneratorConfig>),
}

/// Pool parameter for pick/take/shuffle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Pool {
    /// Literal list of values
    Values(Vec<serde_yaml::Value>),

    /// Generator producing the pool
    Generator(Box<GeneratorConfig>),
}

/// One step of a projection path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// Array position
    Index(usize),

    /// Object field name
    Field(String),
}

impl From<&PathSegment> for Key {
    fn from(segment: &PathSegment) -> Self {
        match segment {
            PathSegment::Index(i) => Key::Index(*i),
            PathSegment::Field(name) => Key::Field(name.clone()),
        }
    }
}

/// Generator configuration for a recipe node.
///
/// This enum defines the different kinds of generators a recipe can
/// describe. Every node produces a [`Value`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GeneratorConfig {
    /// Always produce the same value
    Constant {
        /// The constant value
        value: serde_yaml::Value,
    },

    /// Uniform floats in `[min, max)`
    Uniform {
        /// Lower bound
        min: Param,
        /// Upper bound
        max: Param,
        /// Seed for this node's PRNG
        #[serde(default)]
        seed: Option<u32>,
    },

    /// Uniform integers in `[min, max)` (floored uniform floats)
    Integer {
        /// Lower bound
        min: Param,
        /// Upper bound
        max: Param,
        /// Seed for this node's PRNG
        #[serde(default)]
        seed: Option<u32>,
    },

    /// Normally distributed floats
    Gaussian {
        /// Mean
        mean: Param,
        /// Standard deviation
        std: Param,
        /// Seed for this node's PRNG
        #[serde(default)]
        seed: Option<u32>,
    },

    /// Exponentially distributed floats
    Exponential {
        /// Rate parameter
        lambda: Param,
        /// Seed for this node's PRNG
        #[serde(default)]
        seed: Option<u32>,
    },

    /// One element of a pool
    Pick {
        /// Pool to pick from
        pool: Pool,
        /// Seed for this node's PRNG
        #[serde(default)]
        seed: Option<u32>,
    },

    /// Several distinct elements of a pool
    Take {
        /// Number of elements to take
        count: Count,
        /// Pool to take from
        pool: Pool,
        /// Seed for this node's PRNG
        #[serde(default)]
        seed: Option<u32>,
    },

    /// A permutation of a pool
    Shuffle {
        /// Pool to shuffle
        pool: Pool,
        /// Seed for this node's PRNG
        #[serde(default)]
        seed: Option<u32>,
    },

    /// String interpolation of `{}` placeholders
    Compose {
        /// Template with `{}` placeholders
        template: String,
        /// One generator per placeholder
        #[serde(default)]
        parts: Vec<GeneratorConfig>,
    },

    /// Object with one generator per field
    Object {
        /// Field generators
        fields: BTreeMap<String, GeneratorConfig>,
    },

    /// Array of repeated draws
    Repeat {
        /// Element generator
        of: Box<GeneratorConfig>,
        /// Number of elements
        times: Count,
    },

    /// Reference to a named generator, optionally projected
    Ref {
        /// Name declared under `generators`
        name: String,
        /// Projection path into the generated value
        #[serde(default)]
        path: Vec<PathSegment>,
    },
}

impl GeneratorConfig {
    /// Short name of the generator kind, as written in YAML.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Constant { .. } => "constant",
            Self::Uniform { .. } => "uniform",
            Self::Integer { .. } => "integer",
            Self::Gaussian { .. } => "gaussian",
            Self::Exponential { .. } => "exponential",
            Self::Pick { .. } => "pick",
            Self::Take { .. } => "take",
            Self::Shuffle { .. } => "shuffle",
            Self::Compose { .. } => "compose",
            Self::Object { .. } => "object",
            Self::Repeat { .. } => "repeat",
            Self::Ref { .. } => "ref",
        }
    }

    /// Collect the names of every generator referenced below this node.
    pub fn references(&self, names: &mut BTreeSet<String>) {
        fn visit_param(param: &Param, names: &mut BTreeSet<String>) {
            if let Param::Generator(config) = param {
                config.references(names);
            }
        }

        match self {
            Self::Constant { .. } => {}
            Self::Uniform { min, max, .. } | Self::Integer { min, max, .. } => {
                visit_param(min, names);
                visit_param(max, names);
            }
            Self::Gaussian { mean, std, .. } => {
                visit_param(mean, names);
                visit_param(std, names);
            }
            Self::Exponential { lambda, .. } => visit_param(lambda, names),
            Self::Pick { pool, .. } | Self::Shuffle { pool, .. } => pool.references(names),
            Self::Take { count, pool, .. } => {
                count.references(names);
                pool.references(names);
            }
            Self::Compose { parts, .. } => parts.iter().for_each(|p| p.references(names)),
            Self::Object { fields } => fields.values().for_each(|f| f.references(names)),
            Self::Repeat { of, times } => {
                of.references(names);
                times.references(names);
            }
            Self::Ref { name, .. } => {
                names.insert(name.clone());
            }
        }
    }
}

impl Pool {
    fn references(&self, names: &mut BTreeSet<String>) {
        if let Self::Generator(config) = self {
            config.references(names);
        }
    }

    /// Literal pool values converted to [`Value`]s.
    pub fn literal(&self) -> Option<Value> {
        match self {
            Self::Values(values) => Some(Value::Array(values.iter().map(Value::from).collect())),
            Self::Generator(_) => None,
        }
    }
}

impl Count {
    fn references(&self, names: &mut BTreeSet<String>) {
        if let Self::Generator(config) = self {
            config.references(names);
        }
    }
}

/// A complete recipe loaded from YAML.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    /// Root seed; nodes without their own seed derive one from it
    #[serde(default)]
    pub seed: Option<u32>,

    /// Named generators, addressable through `ref` nodes
    #[serde(default)]
    pub generators: BTreeMap<String, GeneratorConfig>,

    /// Generator sampled to produce output documents
    pub output: GeneratorConfig,
}

impl Recipe {
    /// Load a recipe from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RecipeError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse a recipe from a YAML string.
    ///
    /// Every `ref` must name a declared generator.
    pub fn from_yaml(yaml: &str) -> Result<Self, RecipeError> {
        let recipe: Recipe = serde_yaml::from_str(yaml)?;
        recipe.check_references()?;
        Ok(recipe)
    }

    /// Get a named generator.
    pub fn get_generator(&self, name: &str) -> Option<&GeneratorConfig> {
        self.generators.get(name)
    }

    /// Names of all declared generators.
    pub fn generator_names(&self) -> Vec<&str> {
        self.generators.keys().map(String::as_str).collect()
    }

    fn check_references(&self) -> Result<(), RecipeError> {
        let mut names = BTreeSet::new();
        self.output.references(&mut names);
        for config in self.generators.values() {
            config.references(&mut names);
        }
        match names.into_iter().find(|n| !self.generators.contains_key(n)) {
            Some(missing) => Err(RecipeError::UnknownReference(missing)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const SAMPLE_RECIPE: &str = r#"
seed: 1234
generators:
  names:
    type: pick
    pool: [John, Jane, Jack, Jill]
  deck:
    type: shuffle
    pool: [A, K, Q, J]
output:
  type: object
  fields:
    name: { type: ref, name: names }
    age:
      type: gaussian
      mean: 35
      std: { type: uniform, min: 5, max: 10 }
    first_card: { type: ref, name: deck, path: [0] }
    hobbies:
      type: take
      count: 2
      pool: [reading, writing, coding]
"#;

    #[test]
    fn test_parse_recipe() {
        let recipe = Recipe::from_yaml(SAMPLE_RECIPE).unwrap();

        assert_eq!(recipe.seed, Some(1234));
        assert_eq!(recipe.generator_names(), vec!["deck", "names"]);
        assert_eq!(recipe.get_generator("deck").unwrap().kind(), "shuffle");
        assert_eq!(recipe.output.kind(), "object");
    }

    #[test]
    fn test_parse_nested_param() {
        let recipe = Recipe::from_yaml(SAMPLE_RECIPE).unwrap();
        let GeneratorConfig::Object { fields } = &recipe.output else {
            panic!("Expected object output");
        };

        match &fields["age"] {
            GeneratorConfig::Gaussian { mean, std, seed } => {
                assert_eq!(mean, &Param::Number(35.0));
                assert!(matches!(std, Param::Generator(_)));
                assert_eq!(seed, &None);
            }
            other => panic!("Expected gaussian, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_path_segments() {
        let recipe = Recipe::from_yaml(SAMPLE_RECIPE).unwrap();
        let GeneratorConfig::Object { fields } = &recipe.output else {
            panic!("Expected object output");
        };

        match &fields["first_card"] {
            GeneratorConfig::Ref { name, path } => {
                assert_eq!(name, "deck");
                assert_eq!(path, &vec![PathSegment::Index(0)]);
                assert_eq!(Key::from(&path[0]), Key::Index(0));
            }
            other => panic!("Expected ref, got {other:?}"),
        }
    }

    #[test]
    fn test_pool_literal() {
        let pool = Pool::Values(serde_yaml::from_str("[a, 1]").unwrap());
        assert_eq!(
            pool.literal(),
            Some(Value::Array(vec![Value::from("a"), Value::Int(1)]))
        );
    }

    #[test]
    fn test_unknown_reference() {
        let yaml = r#"
output:
  type: ref
  name: missing
"#;
        let result = Recipe::from_yaml(yaml);
        assert!(matches!(result, Err(RecipeError::UnknownReference(name)) if name == "missing"));
    }

    #[test]
    fn test_unknown_generator_type() {
        let yaml = r#"
output:
  type: poisson
  lambda: 3
"#;
        assert!(matches!(
            Recipe::from_yaml(yaml),
            Err(RecipeError::YamlError(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(SAMPLE_RECIPE.as_bytes()).unwrap();

        let recipe = Recipe::from_file(file.path()).unwrap();
        assert_eq!(recipe.generators.len(), 2);
    }
}
