/// One parsed data line: an X value and one value per field.
///
/// Values that failed to parse are `NaN`.
#[derive(Debug, Clone, PartialEq)]
pub struct Point {
    pub x: f64,
    pub values: Vec<f64>,
}

impl Point {
    pub fn new(x: f64, values: Vec<f64>) -> Self {
        Self { x, values }
    }
}
