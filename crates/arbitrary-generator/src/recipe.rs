//! Compile YAML recipes into generator graphs.
//!
//! Every named generator becomes one [`Mimic`]; all `ref` nodes that name
//! it project from that single node, so fields read in one epoch stay
//! correlated. Nodes without an explicit seed get one derived from the
//! root seed and their position in the compilation order.

use crate::arbitrary::{Arbitrary, Factory, Generate, ToNumber};
use crate::error::FactoryError;
use crate::mimic::{IntoMimic, Mimic};
use crate::pool::{compose, pick, shuffle, take};
use crate::random::{time_seed, Exponential, Gaussian, Uniform};
use arbitrary_core::{Count, GeneratorConfig, Key, Param, Pool, Recipe, Value};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Golden-ratio stride between derived seeds.
const SEED_STRIDE: u32 = 0x9E37_79B9;

/// Builds the generator graph of one recipe.
pub struct RecipeCompiler<'a> {
    recipe: &'a Recipe,
    seed: u32,
    counter: u32,
    named: HashMap<String, Mimic>,
    building: Vec<String>,
}

impl<'a> RecipeCompiler<'a> {
    /// Create a compiler using the recipe's seed, or the clock if it has none.
    pub fn new(recipe: &'a Recipe) -> Self {
        Self {
            recipe,
            seed: recipe.seed.unwrap_or_else(time_seed),
            counter: 0,
            named: HashMap::new(),
            building: Vec::new(),
        }
    }

    /// Override the root seed.
    pub fn with_seed(mut self, seed: u32) -> Self {
        self.seed = seed;
        self
    }

    /// Compile every named generator, then the output generator.
    pub fn compile(mut self) -> Result<CompiledRecipe, FactoryError> {
        let recipe = self.recipe;
        debug!(
            "Compiling recipe with {} named generator(s), seed {}",
            recipe.generators.len(),
            self.seed
        );

        for name in recipe.generators.keys() {
            self.named(name)?;
        }
        let output = self.compile_node(&recipe.output)?;

        Ok(CompiledRecipe {
            seed: self.seed,
            output,
            named: self.named.into_iter().collect(),
        })
    }

    fn next_seed(&mut self, explicit: Option<u32>) -> Option<u32> {
        self.counter = self.counter.wrapping_add(1);
        let derived = self
            .seed
            .wrapping_add(self.counter.wrapping_mul(SEED_STRIDE));
        Some(explicit.unwrap_or(derived))
    }

    fn named(&mut self, name: &str) -> Result<Mimic, FactoryError> {
        if let Some(mimic) = self.named.get(name) {
            return Ok(mimic.clone());
        }
        if self.building.iter().any(|n| n == name) {
            return Err(FactoryError::ReferenceCycle(name.to_string()));
        }
        let recipe = self.recipe;
        let config = recipe
            .get_generator(name)
            .ok_or_else(|| FactoryError::UnknownGenerator(name.to_string()))?;

        debug!("Compiling generator '{}' ({})", name, config.kind());
        self.building.push(name.to_string());
        let mimic = self.compile_mimic(config);
        self.building.pop();

        let mimic = mimic?;
        self.named.insert(name.to_string(), mimic.clone());
        Ok(mimic)
    }

    fn compile_mimic(&mut self, config: &GeneratorConfig) -> Result<Mimic, FactoryError> {
        match config {
            GeneratorConfig::Take { count, pool, seed } => {
                let count = self.compile_count(count)?;
                let pool = self.compile_pool(pool)?;
                let seed = self.next_seed(*seed);
                Ok(take(count, pool, seed))
            }
            GeneratorConfig::Shuffle { pool, seed } => {
                let pool = self.compile_pool(pool)?;
                let seed = self.next_seed(*seed);
                Ok(shuffle(pool, seed))
            }
            GeneratorConfig::Ref { name, path } => {
                let keys: Vec<Key> = path.iter().map(Key::from).collect();
                Ok(self.named(name)?.path(&keys).into_mimic())
            }
            other => Ok(Mimic::new(self.compile_node(other)?)),
        }
    }

    fn compile_node(&mut self, config: &GeneratorConfig) -> Result<Arbitrary<Value>, FactoryError> {
        match config {
            GeneratorConfig::Constant { value } => Ok(Arbitrary::constant(Value::from(value))),

            GeneratorConfig::Uniform { min, max, seed } => {
                let (min, max) = (self.compile_param(min)?, self.compile_param(max)?);
                let seed = self.next_seed(*seed);
                Ok(Uniform::new(min, max, seed)?.map(Value::Float))
            }

            GeneratorConfig::Integer { min, max, seed } => {
                let (min, max) = (self.compile_param(min)?, self.compile_param(max)?);
                let seed = self.next_seed(*seed);
                Ok(Uniform::new(min, max, seed)?.map(|x| Value::Int(x.floor() as i64)))
            }

            GeneratorConfig::Gaussian { mean, std, seed } => {
                let (mean, std) = (self.compile_param(mean)?, self.compile_param(std)?);
                let seed = self.next_seed(*seed);
                Ok(Gaussian::new(mean, std, seed)?.map(Value::Float))
            }

            GeneratorConfig::Exponential { lambda, seed } => {
                let lambda = self.compile_param(lambda)?;
                let seed = self.next_seed(*seed);
                Ok(Exponential::new(lambda, seed)?.map(Value::Float))
            }

            GeneratorConfig::Pick { pool, seed } => {
                let pool = self.compile_pool(pool)?;
                let seed = self.next_seed(*seed);
                Ok(pick(pool, seed))
            }

            GeneratorConfig::Take { .. }
            | GeneratorConfig::Shuffle { .. }
            | GeneratorConfig::Ref { .. } => self.compile_projected(config),

            GeneratorConfig::Compose { template, parts } => {
                let parts = parts
                    .iter()
                    .map(|part| self.compile_node(part))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(compose(template, parts)?.map(Value::String))
            }

            GeneratorConfig::Object { fields } => {
                let fields = fields
                    .iter()
                    .map(|(name, field)| Ok((name.clone(), self.compile_node(field)?)))
                    .collect::<Result<BTreeMap<_, _>, FactoryError>>()?;
                Ok(Arbitrary::from_source_fn(move |source| {
                    Value::Object(
                        fields
                            .iter()
                            .map(|(name, field)| (name.clone(), field.invoke(source)))
                            .collect(),
                    )
                }))
            }

            GeneratorConfig::Repeat { of, times } => {
                let of = self.compile_node(of)?;
                let times = self.compile_count(times)?;
                Ok(of.repeat(times).map(Value::Array))
            }
        }
    }

    /// Nodes backed by a projection. A `ref` without a path regenerates the
    /// shared named node on every draw.
    fn compile_projected(
        &mut self,
        config: &GeneratorConfig,
    ) -> Result<Arbitrary<Value>, FactoryError> {
        if let GeneratorConfig::Ref { name, path } = config {
            let keys: Vec<Key> = path.iter().map(Key::from).collect();
            return Ok(self.named(name)?.path(&keys).to_arbitrary());
        }
        Ok(self.compile_mimic(config)?.as_arbitrary())
    }

    fn compile_param(&mut self, param: &Param) -> Result<Factory<f64>, FactoryError> {
        match param {
            Param::Number(x) => Ok(Factory::constant(*x)),
            Param::Generator(config) => {
                let arbitrary = self.compile_node(config)?;
                Ok(arbitrary.map(|v| v.to_number()).into())
            }
        }
    }

    fn compile_count(&mut self, count: &Count) -> Result<Factory<usize>, FactoryError> {
        match count {
            Count::Fixed(n) => Ok(Factory::constant(*n)),
            Count::Generator(config) => {
                let arbitrary = self.compile_node(config)?;
                Ok(arbitrary
                    .map(|v| {
                        let n = v.to_number();
                        if n.is_finite() && n > 0.0 {
                            n.floor() as usize
                        } else {
                            0
                        }
                    })
                    .into())
            }
        }
    }

    fn compile_pool(&mut self, pool: &Pool) -> Result<Mimic, FactoryError> {
        match pool {
            Pool::Values(_) => Ok(pool.literal().unwrap_or_default().into_mimic()),
            Pool::Generator(config) => self.compile_mimic(config),
        }
    }
}

/// A compiled recipe, ready to sample.
#[derive(Debug)]
pub struct CompiledRecipe {
    seed: u32,
    output: Arbitrary<Value>,
    named: BTreeMap<String, Mimic>,
}

impl CompiledRecipe {
    /// Compile `recipe` with its own seed.
    pub fn compile(recipe: &Recipe) -> Result<Self, FactoryError> {
        RecipeCompiler::new(recipe).compile()
    }

    /// Root seed the graph was built from.
    pub fn seed(&self) -> u32 {
        self.seed
    }

    /// The output generator.
    pub fn output(&self) -> &Arbitrary<Value> {
        &self.output
    }

    /// A named generator.
    pub fn generator(&self, name: &str) -> Option<&Mimic> {
        self.named.get(name)
    }

    /// Names of all compiled generators, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.named.keys().map(String::as_str)
    }

    /// Draw `count` output documents.
    pub fn sample(&self, count: usize) -> Vec<Value> {
        self.output.sample(count)
    }
}
