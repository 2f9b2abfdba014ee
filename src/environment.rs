use crate::{DefaultEnvironment, IEnvironment, IGenerator};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::rc::Rc;

impl<TItem> DefaultEnvironment<TItem> {
    pub fn new() -> Self {
        Self {
            generators: HashMap::new(),
            priorities: HashMap::new(),
        }
    }

    /// Register a generator under its [key](IGenerator::key).
    pub fn add_generator(
        &mut self,
        generator: Rc<dyn IGenerator<Item = TItem>>,
    ) -> Result<(), String> {
        let key = generator.key();
        if self.generators.contains_key(key) {
            return Err(format!("Generator '{}' is already registered.", key));
        }
        self.generators.insert(key, generator);
        Ok(())
    }

    /// Assign a reordering priority to a generator key.
    pub fn set_priority(&mut self, key: &str, priority: i32) {
        self.priorities.insert(key.to_string(), priority);
    }

    /// The priority table, in the shape [reorder_conjunctions](crate::reorder_conjunctions)
    /// and [QueryParser::set_priorities](crate::QueryParser::set_priorities) take.
    pub fn priorities(&self) -> &HashMap<String, i32> {
        &self.priorities
    }
}

impl<TItem> Default for DefaultEnvironment<TItem> {
    fn default() -> Self {
        Self::new()
    }
}

impl<TItem: Debug + Clone + Eq + Hash> IEnvironment for DefaultEnvironment<TItem> {
    type Item = TItem;

    fn generator(&self, key: &str) -> Option<&dyn IGenerator<Item = TItem>> {
        self.generators.get(key).map(|generator| generator.as_ref())
    }

    fn priority(&self, key: &str) -> i32 {
        self.priorities.get(key).copied().unwrap_or(0)
    }
}
