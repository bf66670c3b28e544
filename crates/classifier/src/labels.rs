use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use crate::{ClassifierError, Result};

/// A gesture label: its position in the label set plus its name.
///
/// Equality is by position, so two labels from the same set compare cheaply.
#[derive(Debug, Clone)]
pub struct Label {
    index: usize,
    name: Arc<str>,
}

impl Label {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl Eq for Label {}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Fixed, ordered set of gesture labels.
///
/// Order and cardinality must match what the classifier was trained on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelSet {
    names: Arc<[Arc<str>]>,
}

impl LabelSet {
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let names: Vec<Arc<str>> = names
            .into_iter()
            .map(|s| Arc::<str>::from(s.as_ref().trim()))
            .collect();

        if names.is_empty() {
            return Err(ClassifierError::InvalidLabelSet(
                "at least one label is required".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for name in &names {
            if name.is_empty() {
                return Err(ClassifierError::InvalidLabelSet(
                    "labels must not be empty".to_string(),
                ));
            }
            if !seen.insert(name.clone()) {
                return Err(ClassifierError::InvalidLabelSet(format!(
                    "duplicate label '{name}'"
                )));
            }
        }

        Ok(Self {
            names: names.into(),
        })
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<Label> {
        self.names.get(index).map(|name| Label {
            index,
            name: name.clone(),
        })
    }

    /// Label at `index`; callers guarantee the index is in range.
    pub(crate) fn at(&self, index: usize) -> Label {
        Label {
            index,
            name: self.names[index].clone(),
        }
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n.as_ref() == name)
    }

    pub fn label(&self, name: &str) -> Option<Label> {
        self.index_of(name).and_then(|i| self.get(i))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> + '_ {
        self.names.iter().map(|n| n.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = Label> + '_ {
        (0..self.names.len()).filter_map(|i| self.get(i))
    }
}
