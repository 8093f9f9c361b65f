//! Startup configuration.

use particle_physics::DAMPING;

/// Fixed parameters for one simulation run.
#[derive(Clone, Copy, Debug)]
pub struct SimConfig {
    pub particle_count: usize,
    pub box_width: f32,
    pub box_height: f32,
    pub use_gpu: bool,
    pub damping: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            particle_count: 4000,
            box_width: 1800.0,
            box_height: 1000.0,
            use_gpu: true,
            damping: DAMPING,
        }
    }
}

impl SimConfig {
    /// Parse command line flags on top of the defaults.
    ///
    /// `--cpu` selects the host stepper, `--undamped` turns velocity
    /// damping off and `--particles N` overrides the population.
    pub fn from_args() -> Self {
        Self::parse(std::env::args().skip(1).collect())
    }

    fn parse(args: Vec<String>) -> Self {
        let mut config = Self::default();

        let mut i = 0;
        while i < args.len() {
            match args[i].as_str() {
                "--cpu" => config.use_gpu = false,
                "--undamped" => config.damping = 0.0,
                "--particles" => match args.get(i + 1).and_then(|s| s.parse::<usize>().ok()) {
                    Some(count) => {
                        config.particle_count = count;
                        i += 1;
                    }
                    None => log::warn!("--particles expects a number"),
                },
                other => log::warn!("Ignoring unknown argument: {}", other),
            }
            i += 1;
        }

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn defaults_match_the_reference_setup() {
        let config = SimConfig::default();

        assert_eq!(config.particle_count, 4000);
        assert_eq!(config.box_width, 1800.0);
        assert_eq!(config.box_height, 1000.0);
        assert!(config.use_gpu);
        assert_eq!(config.damping, DAMPING);
    }

    #[test]
    fn flags_override_the_defaults() {
        let config = SimConfig::parse(args(&["--cpu", "--undamped", "--particles", "256"]));

        assert!(!config.use_gpu);
        assert_eq!(config.damping, 0.0);
        assert_eq!(config.particle_count, 256);
    }

    #[test]
    fn bad_particle_counts_keep_the_default() {
        let config = SimConfig::parse(args(&["--particles", "many"]));

        assert_eq!(config.particle_count, 4000);
    }

    #[test]
    fn unknown_arguments_are_ignored() {
        let config = SimConfig::parse(args(&["--turbo"]));

        assert_eq!(config.particle_count, 4000);
        assert!(config.use_gpu);
    }
}
