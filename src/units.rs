use serde_derive::{Deserialize, Serialize};

#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Width(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Height(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Depth(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct NodesCount(pub usize);
#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct EdgesCount(pub usize);

#[derive(Eq, PartialEq, Copy, Clone, Debug)]
pub struct LayerIndex(pub usize);

/// Percentage in the closed range 0..=100.
#[derive(Eq, PartialEq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Percent(pub u8);

impl Percent {
    #[inline]
    pub fn fraction(self) -> f64 {
        f64::from(self.0) / 100.0
    }
}
