use super::{ParameterRegistry, ParameterSpec};

/// `(name, lower, upper, default)` rows of the exp10 search space.
const TABLE: [(&str, f64, f64, f64); 25] = [
    ("prey_move_cost", 0.05, 0.25, 0.12),
    ("pred_move_cost", 0.01, 0.08, 0.025),
    ("pred_bite_reward", 0.4, 0.8, 0.5),
    ("pred_digest_time", 0.2, 3.0, 0.8),
    ("pred_repro_thresh", 0.5, 0.95, 0.85),
    ("prey_cooldown", 4.0, 20.0, 8.0),
    ("pred_cooldown", 6.0, 20.0, 12.0),
    ("parent_energy_split", 0.4, 0.7, 0.55),
    ("spawn_offset", 5.0, 30.0, 15.0),
    ("heading_jitter", 0.0, 1.0, 0.25),
    ("pred_density_k", 10.0, 600.0, 0.0),
    ("newborn_hunt_cooldown", 0.5, 5.0, 2.0),
    ("refugia_strength", 0.5, 1.5, 1.0),
    ("part_spawn_rate", 20.0, 300.0, 100.0),
    ("part_initial_mass", 0.002, 0.05, 0.01),
    ("part_deposit_rate", 0.5, 5.0, 2.0),
    ("part_pickup_rate", 0.1, 3.0, 0.5),
    ("part_cell_capacity", 0.3, 2.0, 1.0),
    ("detritus_fraction", 0.0, 0.30, 0.10),
    ("carcass_fraction", 0.30, 0.90, 0.70),
    ("detritus_decay_rate", 0.01, 0.20, 0.05),
    ("detritus_decay_eff", 0.30, 0.80, 0.50),
    ("grazing_diet_cap", 0.15, 0.50, 0.30),
    ("hunting_diet_floor", 0.50, 0.85, 0.70),
    ("prey_density_k", 50.0, 500.0, 200.0),
];

/// Parameters introduced by exp10, in reporting order.
const NEW_PARAMETERS: [&str; 7] = [
    "detritus_fraction",
    "carcass_fraction",
    "detritus_decay_rate",
    "detritus_decay_eff",
    "grazing_diet_cap",
    "hunting_diet_floor",
    "prey_density_k",
];

impl ParameterRegistry {
    /// Returns the 25-parameter search space of the exp10 predator-prey run.
    ///
    /// The seven detritus and diet parameters the experiment introduced are
    /// designated as new parameters.
    #[must_use]
    pub fn exp10() -> Self {
        // Known-good table, unwrap is safe
        let specs = TABLE
            .iter()
            .map(|&(name, lower, upper, default)| {
                ParameterSpec::new(name, lower, upper, default).unwrap()
            });

        Self::new(specs)
            .unwrap()
            .with_new_parameters(NEW_PARAMETERS)
            .unwrap()
    }
}
