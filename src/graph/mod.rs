mod core;
pub mod undirected;

pub use self::core::{Edge, EdgeKey, Graph, Node, NodeKind};
pub use self::undirected::{BasisNeighbor, BasisView};
