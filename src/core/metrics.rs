/// Point-in-time container resource metrics
///
/// The host returns one stats sample that carries both the current and the
/// previous CPU counters, so utilization is a two-sample delta computed
/// without keeping any state between cycles.

/// Raw counters from one stats sample
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StatsSample {
    pub cpu_total: u64,
    pub precpu_total: u64,
    pub system_cpu: u64,
    pub presystem_cpu: u64,
    /// Number of per-core usage entries (0 when the host reports none)
    pub cpu_count: usize,
    pub mem_usage: u64,
    pub mem_limit: u64,
}

impl StatsSample {
    pub fn cpu_percent(&self) -> f64 {
        let cpu_delta = self.cpu_total as f64 - self.precpu_total as f64;
        let system_delta = self.system_cpu as f64 - self.presystem_cpu as f64;
        cpu_percent(cpu_delta, system_delta, self.cpu_count)
    }
}

/// `(cpu_delta / system_delta) * cores * 100`, or 0 unless both deltas are positive
pub fn cpu_percent(cpu_delta: f64, system_delta: f64, cpu_count: usize) -> f64 {
    if cpu_delta <= 0.0 || system_delta <= 0.0 {
        return 0.0;
    }
    let cores = if cpu_count == 0 { 1 } else { cpu_count };
    (cpu_delta / system_delta) * cores as f64 * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_formula() {
        assert_eq!(cpu_percent(200.0, 1000.0, 4), 80.0);
        assert_eq!(cpu_percent(200.0, 0.0, 4), 0.0);
        assert_eq!(cpu_percent(200.0, -10.0, 4), 0.0);
        assert_eq!(cpu_percent(0.0, 1000.0, 4), 0.0);
    }

    #[test]
    fn test_missing_core_count_defaults_to_one() {
        assert_eq!(cpu_percent(100.0, 1000.0, 0), 10.0);
    }

    #[test]
    fn test_sample_deltas() {
        let sample = StatsSample {
            cpu_total: 1_200,
            precpu_total: 1_000,
            system_cpu: 11_000,
            presystem_cpu: 10_000,
            cpu_count: 4,
            mem_usage: 64,
            mem_limit: 128,
        };
        assert_eq!(sample.cpu_percent(), 80.0);

        // Counter reset on the host must not underflow
        let reset = StatsSample {
            cpu_total: 10,
            precpu_total: 1_000,
            ..sample
        };
        assert_eq!(reset.cpu_percent(), 0.0);
    }
}
