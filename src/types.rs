use crate::error::{SciportError, SciportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

//==============================================================================
// Components
//==============================================================================

/// Label identifying a component within a dataset
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Component value arrays (homogeneous, flattened row-major)
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentValues {
    /// Numeric values; missing entries are NaN
    Numeric(Vec<f64>),
    /// Categorical/text values
    Text(Vec<String>),
}

impl ComponentValues {
    /// Get the length of the array
    pub fn len(&self) -> usize {
        match self {
            ComponentValues::Numeric(v) => v.len(),
            ComponentValues::Text(v) => v.len(),
        }
    }

    /// Check if array is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, ComponentValues::Numeric(_))
    }

    /// Get the kind name as a string
    pub fn kind(&self) -> &'static str {
        match self {
            ComponentValues::Numeric(_) => "numerical",
            ComponentValues::Text(_) => "categorical",
        }
    }

    pub fn as_numeric(&self) -> Option<&[f64]> {
        match self {
            ComponentValues::Numeric(v) => Some(v),
            ComponentValues::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            ComponentValues::Text(v) => Some(v),
            ComponentValues::Numeric(_) => None,
        }
    }
}

impl From<Vec<f64>> for ComponentValues {
    fn from(v: Vec<f64>) -> Self {
        ComponentValues::Numeric(v)
    }
}

impl From<Vec<String>> for ComponentValues {
    fn from(v: Vec<String>) -> Self {
        ComponentValues::Text(v)
    }
}

impl From<Vec<&str>> for ComponentValues {
    fn from(v: Vec<&str>) -> Self {
        ComponentValues::Text(v.into_iter().map(str::to_string).collect())
    }
}

/// A named array plus its physical units
#[derive(Debug, Clone, PartialEq)]
pub struct Component {
    pub values: ComponentValues,
    /// Unit string; `Some("")` is an explicitly dimensionless component
    pub units: Option<String>,
}

impl Component {
    pub fn new(values: impl Into<ComponentValues>) -> Self {
        Self {
            values: values.into(),
            units: None,
        }
    }

    pub fn with_units(mut self, units: impl Into<String>) -> Self {
        self.units = Some(units.into());
        self
    }
}

//==============================================================================
// Coordinates
//==============================================================================

/// FITS header card value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Int(i64),
    Float(f64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderCard {
    pub key: String,
    pub value: HeaderValue,
}

impl HeaderCard {
    pub fn new(key: impl Into<String>, value: HeaderValue) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// World coordinate header cards attached to gridded data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub cards: Vec<HeaderCard>,
}

impl Coordinates {
    /// Default linear WCS: pixel coordinates mapped 1:1 onto world coordinates
    pub fn linear(ndim: usize) -> Self {
        let mut cards = vec![HeaderCard::new("WCSAXES", HeaderValue::Int(ndim as i64))];
        for axis in 1..=ndim {
            cards.push(HeaderCard::new(format!("CRPIX{axis}"), HeaderValue::Float(0.0)));
            cards.push(HeaderCard::new(format!("CDELT{axis}"), HeaderValue::Float(1.0)));
            cards.push(HeaderCard::new(format!("CUNIT{axis}"), HeaderValue::Text(String::new())));
            cards.push(HeaderCard::new(format!("CTYPE{axis}"), HeaderValue::Text(String::new())));
            cards.push(HeaderCard::new(format!("CRVAL{axis}"), HeaderValue::Float(0.0)));
        }
        Self { cards }
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards.iter().find(|c| c.key == key).map(|c| &c.value)
    }

    /// Set a card, replacing an existing one with the same key
    pub fn set(&mut self, key: impl Into<String>, value: HeaderValue) {
        let key = key.into();
        match self.cards.iter_mut().find(|c| c.key == key) {
            Some(card) => card.value = value,
            None => self.cards.push(HeaderCard { key, value }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

//==============================================================================
// Dataset
//==============================================================================

/// A labelled collection of equally-shaped components
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    pub label: String,
    shape: Vec<usize>,
    components: Vec<(ComponentId, Component)>,
    pub coords: Option<Coordinates>,
}

impl Dataset {
    pub fn new(label: impl Into<String>, shape: Vec<usize>) -> Self {
        Self {
            label: label.into(),
            shape,
            components: Vec::new(),
            coords: None,
        }
    }

    /// Build a dataset from `(name, values)` pairs sharing `shape`
    pub fn from_arrays<I, N, V>(label: impl Into<String>, shape: Vec<usize>, arrays: I) -> SciportResult<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<ComponentId>,
        V: Into<ComponentValues>,
    {
        let mut data = Self::new(label, shape);
        for (name, values) in arrays {
            data.add_component(name, Component::new(values))?;
        }
        Ok(data)
    }

    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    pub fn ndim(&self) -> usize {
        self.shape.len()
    }

    /// Number of elements in each component
    pub fn size(&self) -> usize {
        self.shape.iter().product()
    }

    /// Add a component, replacing any existing component with the same id
    pub fn add_component(&mut self, id: impl Into<ComponentId>, component: Component) -> SciportResult<()> {
        let id = id.into();
        if component.values.len() != self.size() {
            return Err(SciportError::Shape(format!(
                "component '{}' has {} values but dataset '{}' has shape {:?} ({} values)",
                id,
                component.values.len(),
                self.label,
                self.shape,
                self.size()
            )));
        }

        match self.components.iter_mut().find(|(existing, _)| *existing == id) {
            Some((_, slot)) => *slot = component,
            None => self.components.push((id, component)),
        }
        Ok(())
    }

    pub fn component_ids(&self) -> impl Iterator<Item = &ComponentId> {
        self.components.iter().map(|(id, _)| id)
    }

    pub fn components(&self) -> impl Iterator<Item = (&ComponentId, &Component)> {
        self.components.iter().map(|(id, c)| (id, c))
    }

    pub fn num_components(&self) -> usize {
        self.components.len()
    }

    /// Look up a component id by label
    pub fn id(&self, label: &str) -> Option<&ComponentId> {
        self.component_ids().find(|id| id.label() == label)
    }

    pub fn get_component(&self, label: &str) -> SciportResult<&Component> {
        self.components
            .iter()
            .find(|(id, _)| id.label() == label)
            .map(|(_, c)| c)
            .ok_or_else(|| self.unknown(label))
    }

    pub fn get_component_mut(&mut self, label: &str) -> SciportResult<&mut Component> {
        let unknown = self.unknown(label);
        self.components
            .iter_mut()
            .find(|(id, _)| id.label() == label)
            .map(|(_, c)| c)
            .ok_or(unknown)
    }

    pub fn values(&self, label: &str) -> SciportResult<&ComponentValues> {
        self.get_component(label).map(|c| &c.values)
    }

    /// Numeric values of a component; errors for text components
    pub fn numeric(&self, label: &str) -> SciportResult<&[f64]> {
        self.values(label)?.as_numeric().ok_or_else(|| {
            SciportError::Shape(format!("component '{}' is not numeric", label))
        })
    }

    pub fn set_units(&mut self, label: &str, units: impl Into<String>) -> SciportResult<()> {
        self.get_component_mut(label)?.units = Some(units.into());
        Ok(())
    }

    fn unknown(&self, label: &str) -> SciportError {
        SciportError::UnknownComponent(format!("'{}' in dataset '{}'", label, self.label))
    }
}

/// Dataset label base for a file: its name without extension
pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "data".to_string())
}
