// Coverage analysis: the numbers behind the alignment charts.

pub mod aggregate;
pub mod sample;
pub mod table;
