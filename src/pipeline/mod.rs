// The alignment pipeline: normalize -> matrices -> fit -> infer -> report.

pub mod alignment;
