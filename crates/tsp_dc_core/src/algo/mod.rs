pub(crate) mod divide;
pub(crate) mod greedy;
pub(crate) mod pool;
pub(crate) mod solver;
