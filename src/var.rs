use std::{
    cmp::Ordering,
    fmt,
    hash::{Hash, Hasher},
};

use uuid::Uuid; //identifies the owning model

/// A decision variable of a [`crate::model::Model`].
///
/// Variables are only created through `Model::create_variable`. Identity is
/// the index within the owning model (together with the model id), the name
/// is only used for display.
#[derive(Clone, Debug)]
pub struct Variable {
    pub(crate) name: String,
    pub(crate) index: usize,
    pub(crate) model_id: Uuid,
}

impl Variable {
    pub(crate) fn new<T: ToString>(name: T, index: usize, model_id: Uuid) -> Self {
        Self {
            name: name.to_string(),
            index,
            model_id,
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub(crate) fn model_id(&self) -> Uuid {
        self.model_id
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.model_id == other.model_id
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.model_id.hash(state);
        self.index.hash(state);
    }
}

//ordered by index so expressions render in model order
impl Ord for Variable {
    fn cmp(&self, other: &Self) -> Ordering {
        self.index
            .cmp(&other.index)
            .then_with(|| self.model_id.cmp(&other.model_id))
    }
}

impl PartialOrd for Variable {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
