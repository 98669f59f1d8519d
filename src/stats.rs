use std::fmt;

/// Descriptive statistics over a set of samples.
///
/// Non-finite samples are not measurements and are left out before anything
/// is computed. With nothing left, there is no summary at all.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divides by `count`).
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl Summary {
    pub fn of<I>(samples: I) -> Option<Self>
    where
        I: IntoIterator<Item = f64>,
    {
        let mut values: Vec<f64> = samples.into_iter().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let count = values.len();
        let mean = values.iter().sum::<f64>() / count as f64;
        let median = if count % 2 == 1 {
            values[count / 2]
        } else {
            (values[count / 2 - 1] + values[count / 2]) / 2.0
        };
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / count as f64;

        Some(Summary {
            count,
            mean,
            median,
            std_dev: variance.sqrt(),
            min: values[0],
            max: values[count - 1],
        })
    }

    pub fn range(&self) -> f64 {
        self.max - self.min
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:>10.3} | {:>10.3} | {:>10.3} | {:>10.3} | {:>10.3} | {:>6}",
            self.mean, self.median, self.std_dev, self.min, self.max, self.count
        )
    }
}

pub fn header() -> String {
    format!(
        "{:>10} | {:>10} | {:>10} | {:>10} | {:>10} | {:>6}",
        "Mean", "Median", "StdDev", "Min", "Max", "N"
    )
}

/// Position of the largest finite value, first one on ties.
pub fn argmax<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let mut best: Option<(usize, f64)> = None;
    for (i, v) in values.into_iter().enumerate() {
        let Some(v) = v.filter(|v| v.is_finite()) else {
            continue;
        };
        match best {
            Some((_, b)) if v <= b => {}
            _ => best = Some((i, v)),
        }
    }
    best.map(|(i, _)| i)
}

/// Position of the smallest finite value, first one on ties.
pub fn argmin<I>(values: I) -> Option<usize>
where
    I: IntoIterator<Item = f64>,
{
    argmax(values.into_iter().map(|v| Some(-v)))
}
