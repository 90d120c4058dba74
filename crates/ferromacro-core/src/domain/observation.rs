use time::Date;

/// One dated value from a provider. `value` is `None` for a published gap.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Observation {
    pub date: Date,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: Date, value: Option<f64>) -> Self {
        Self {
            date,
            value: value.filter(|v| v.is_finite()),
        }
    }

    pub fn present(date: Date, value: f64) -> Self {
        Self::new(date, Some(value))
    }

    pub fn missing(date: Date) -> Self {
        Self { date, value: None }
    }
}

/// Observations for a single provider identifier, sorted by date with one
/// observation per date.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObservationSeries {
    observations: Vec<Observation>,
}

impl ObservationSeries {
    /// Sorts by date; when a date repeats, the later observation wins.
    pub fn new(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|obs| obs.date);
        let mut deduped: Vec<Observation> = Vec::with_capacity(observations.len());
        for obs in observations {
            match deduped.last_mut() {
                Some(last) if last.date == obs.date => *last = obs,
                _ => deduped.push(obs),
            }
        }
        Self {
            observations: deduped,
        }
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn present_count(&self) -> usize {
        self.observations
            .iter()
            .filter(|obs| obs.value.is_some())
            .count()
    }

    pub fn dates(&self) -> impl Iterator<Item = Date> + '_ {
        self.observations.iter().map(|obs| obs.date)
    }

    pub fn value_on(&self, date: Date) -> Option<f64> {
        self.observations
            .binary_search_by_key(&date, |obs| obs.date)
            .ok()
            .and_then(|idx| self.observations[idx].value)
    }
}

impl FromIterator<Observation> for ObservationSeries {
    fn from_iter<I: IntoIterator<Item = Observation>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
