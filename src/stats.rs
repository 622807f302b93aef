use regex::Regex;

/// Number of tick steps an animation takes from 0 to its target.
pub const ANIMATION_STEPS: u32 = 50;

/// A single animated statistic, counting up from zero to a target parsed
/// out of a display string like "500+", "92%" or "10000".
#[derive(Debug, Clone)]
pub struct StatCounter {
    pub label: String,
    target: u64,
    current: f64,
    increment: f64,
    has_plus: bool,
    has_percent: bool,
}

impl StatCounter {
    pub fn new(label: &str, display: &str) -> Self {
        let target = parse_target(display);
        Self {
            label: label.to_string(),
            target,
            current: 0.0,
            increment: target as f64 / ANIMATION_STEPS as f64,
            has_plus: display.contains('+'),
            has_percent: display.contains('%'),
        }
    }

    /// Advance one animation step. No-op once the target is reached.
    pub fn step(&mut self) {
        if self.is_done() {
            return;
        }
        self.current += self.increment;
        if self.current >= self.target as f64 {
            self.current = self.target as f64;
        }
    }

    pub fn is_done(&self) -> bool {
        self.current >= self.target as f64
    }

    /// Jump straight to the final value.
    pub fn finish(&mut self) {
        self.current = self.target as f64;
    }

    /// Current display value with K/M scaling and the original suffix
    /// decoration. Millions are checked before thousands.
    pub fn display(&self) -> String {
        let current = self.current;
        let mut value = if self.target >= 1_000_000 {
            format!("{:.1}M", (current / 100_000.0).floor() / 10.0)
        } else if self.target >= 1_000 {
            format!("{:.1}K", (current / 100.0).floor() / 10.0)
        } else {
            format!("{}", current.floor() as u64)
        };

        if self.has_plus {
            value.push('+');
        }
        if self.has_percent {
            value.push('%');
        }
        value
    }
}

fn parse_target(display: &str) -> u64 {
    let Ok(re) = Regex::new(r"[0-9]+") else {
        return 0;
    };
    let digits: String = re.find_iter(display).map(|m| m.as_str()).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run_to_completion(counter: &mut StatCounter) {
        for _ in 0..ANIMATION_STEPS + 1 {
            counter.step();
        }
    }

    #[test]
    fn test_plus_suffix_preserved() {
        let mut counter = StatCounter::new("Doctors", "500+");
        run_to_completion(&mut counter);
        assert_eq!(counter.display(), "500+");
    }

    #[test]
    fn test_percent_suffix_preserved() {
        let mut counter = StatCounter::new("Accuracy", "92%");
        run_to_completion(&mut counter);
        assert_eq!(counter.display(), "92%");
    }

    #[test]
    fn test_thousands_scale_to_k() {
        let mut counter = StatCounter::new("Users", "10000");
        run_to_completion(&mut counter);
        assert_eq!(counter.display(), "10.0K");
    }

    #[test]
    fn test_millions_scale_to_m() {
        let mut counter = StatCounter::new("Consultations", "1500000");
        run_to_completion(&mut counter);
        assert_eq!(counter.display(), "1.5M");
    }

    #[test]
    fn test_separators_ignored_when_parsing() {
        let mut counter = StatCounter::new("Users", "1,200+");
        counter.finish();
        assert_eq!(counter.display(), "1.2K+");
    }

    #[test]
    fn test_starts_at_zero_and_advances() {
        let mut counter = StatCounter::new("Doctors", "500+");
        assert_eq!(counter.display(), "0+");
        counter.step();
        assert!(!counter.is_done());
        assert_eq!(counter.display(), "10+");
    }

    #[test]
    fn test_non_numeric_target_is_zero() {
        let counter = StatCounter::new("Support", "n/a");
        assert!(counter.is_done());
        assert_eq!(counter.display(), "0");
    }
}
