//! Spring connections and the topology caches derived from them.

use crate::error::{SetupError, SetupResult};

/// Spring parameters for a single connection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ConnectionParams {
    /// Rest length (> 0).
    pub rest_length: f32,
    /// Hooke spring constant (>= 0).
    pub spring_constant: f32,
    /// Damper constant along the spring axis (>= 0).
    pub damper_constant: f32,
}

impl Default for ConnectionParams {
    fn default() -> Self {
        Self {
            rest_length: 1.0,
            spring_constant: 100.0,
            damper_constant: 10.0,
        }
    }
}

impl ConnectionParams {
    /// Creates connection parameters.
    pub fn new(rest_length: f32, spring_constant: f32, damper_constant: f32) -> Self {
        Self {
            rest_length,
            spring_constant,
            damper_constant,
        }
    }

    /// Checks the parameter ranges.
    pub fn validate(&self) -> SetupResult<()> {
        if !(self.rest_length.is_finite() && self.rest_length > 0.0) {
            return Err(SetupError::InvalidRestLength(self.rest_length));
        }
        let valid = |v: f32| v.is_finite() && v >= 0.0;
        if !valid(self.spring_constant) || !valid(self.damper_constant) {
            return Err(SetupError::InvalidSpringParameters {
                spring: self.spring_constant,
                damper: self.damper_constant,
            });
        }
        Ok(())
    }
}

/// A damped spring between two points, referenced by index.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Connection {
    /// First point index.
    pub a: usize,
    /// Second point index.
    pub b: usize,
    /// Rest length.
    pub rest_length: f32,
    /// Spring constant.
    pub spring_constant: f32,
    /// Damper constant.
    pub damper_constant: f32,
}

impl Connection {
    /// Creates a connection from validated parameters.
    pub fn new(a: usize, b: usize, params: ConnectionParams) -> Self {
        Self {
            a,
            b,
            rest_length: params.rest_length,
            spring_constant: params.spring_constant,
            damper_constant: params.damper_constant,
        }
    }
}

/// Per-point list of incident connections in CSR layout.
///
/// Each entry carries the sign the connection's net force takes at that
/// point: `+1` at endpoint `a`, `-1` at endpoint `b`.
#[derive(Debug, Clone, Default)]
pub struct Incidence {
    offsets: Vec<usize>,
    entries: Vec<(usize, f32)>,
}

impl Incidence {
    /// Builds incidence lists, preserving connection order within each list.
    pub fn build(point_count: usize, connections: &[Connection]) -> Self {
        let mut counts = vec![0usize; point_count + 1];
        for c in connections {
            counts[c.a + 1] += 1;
            counts[c.b + 1] += 1;
        }
        for i in 0..point_count {
            counts[i + 1] += counts[i];
        }
        let offsets = counts;

        let mut cursor = offsets.clone();
        let mut entries = vec![(0usize, 0.0f32); connections.len() * 2];
        for (ci, c) in connections.iter().enumerate() {
            entries[cursor[c.a]] = (ci, 1.0);
            cursor[c.a] += 1;
            entries[cursor[c.b]] = (ci, -1.0);
            cursor[c.b] += 1;
        }

        Self { offsets, entries }
    }

    /// Connections touching a point, with their force sign.
    pub fn of(&self, point: usize) -> &[(usize, f32)] {
        match (self.offsets.get(point), self.offsets.get(point + 1)) {
            (Some(&start), Some(&end)) => &self.entries[start..end],
            _ => &[],
        }
    }

    /// Number of points covered.
    pub fn point_count(&self) -> usize {
        self.offsets.len().saturating_sub(1)
    }
}

/// Connections partitioned so that no two in a wave share a point.
///
/// Built by greedy graph colouring in connection order: each connection
/// goes into the first wave where neither endpoint is taken.
#[derive(Debug, Clone, Default)]
pub struct ConnectionWaves {
    waves: Vec<Vec<usize>>,
}

impl ConnectionWaves {
    /// Colours the connection graph.
    pub fn build(point_count: usize, connections: &[Connection]) -> Self {
        // Waves each point already belongs to, kept sorted.
        let mut taken: Vec<Vec<usize>> = vec![Vec::new(); point_count];
        let mut waves: Vec<Vec<usize>> = Vec::new();

        for (ci, c) in connections.iter().enumerate() {
            let wave = first_free_wave(&taken[c.a], &taken[c.b]);
            if waves.len() <= wave {
                waves.resize_with(wave + 1, Vec::new);
            }
            waves[wave].push(ci);

            for p in [c.a, c.b] {
                if let Err(pos) = taken[p].binary_search(&wave) {
                    taken[p].insert(pos, wave);
                }
            }
        }

        Self { waves }
    }

    /// All waves in execution order.
    pub fn waves(&self) -> &[Vec<usize>] {
        &self.waves
    }

    /// Number of waves.
    pub fn len(&self) -> usize {
        self.waves.len()
    }

    /// Returns true if there are no connections.
    pub fn is_empty(&self) -> bool {
        self.waves.is_empty()
    }
}

/// Smallest wave index absent from both sorted lists.
fn first_free_wave(a: &[usize], b: &[usize]) -> usize {
    let mut candidate = 0;
    loop {
        let in_a = a.binary_search(&candidate).is_ok();
        let in_b = b.binary_search(&candidate).is_ok();
        if !in_a && !in_b {
            return candidate;
        }
        candidate += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn chain(n: usize) -> Vec<Connection> {
        (0..n - 1)
            .map(|i| Connection::new(i, i + 1, ConnectionParams::default()))
            .collect()
    }

    #[test]
    fn test_params_validate() {
        assert!(ConnectionParams::default().validate().is_ok());
        assert_eq!(
            ConnectionParams::new(0.0, 1.0, 1.0).validate(),
            Err(SetupError::InvalidRestLength(0.0))
        );
        assert!(ConnectionParams::new(1.0, -1.0, 0.0).validate().is_err());
        let nan_damper = ConnectionParams::new(1.0, 1.0, f32::NAN);
        assert!(nan_damper.validate().is_err());
    }

    #[test]
    fn test_incidence_signs() {
        let connections = chain(3);
        let incidence = Incidence::build(3, &connections);

        assert_eq!(incidence.point_count(), 3);
        assert_eq!(incidence.of(0), &[(0, 1.0)]);
        assert_eq!(incidence.of(1), &[(0, -1.0), (1, 1.0)]);
        assert_eq!(incidence.of(2), &[(1, -1.0)]);
        assert!(incidence.of(7).is_empty());
    }

    #[test]
    fn test_incidence_isolated_point() {
        let connections = vec![Connection::new(0, 2, ConnectionParams::default())];
        let incidence = Incidence::build(3, &connections);
        assert!(incidence.of(1).is_empty());
        assert_eq!(incidence.of(2), &[(0, -1.0)]);
    }

    #[test]
    fn test_waves_are_race_free() {
        // Triangle fan: every connection touches the hub.
        let mut connections = Vec::new();
        for i in 1..6 {
            connections.push(Connection::new(0, i, ConnectionParams::default()));
            connections.push(Connection::new(i, i % 5 + 1, ConnectionParams::default()));
        }
        let waves = ConnectionWaves::build(6, &connections);

        let mut seen = 0;
        for wave in waves.waves() {
            let mut touched = HashSet::new();
            for &ci in wave {
                let c = connections[ci];
                assert!(touched.insert(c.a), "point {} shared in wave", c.a);
                assert!(touched.insert(c.b), "point {} shared in wave", c.b);
            }
            seen += wave.len();
        }
        assert_eq!(seen, connections.len());
        // The hub has degree 5, so at least 5 waves are needed.
        assert!(waves.len() >= 5);
    }

    #[test]
    fn test_chain_uses_two_waves() {
        let waves = ConnectionWaves::build(6, &chain(6));
        assert_eq!(waves.len(), 2);
        assert_eq!(waves.waves()[0], vec![0, 2, 4]);
        assert_eq!(waves.waves()[1], vec![1, 3]);
    }

    #[test]
    fn test_first_free_wave() {
        assert_eq!(first_free_wave(&[], &[]), 0);
        assert_eq!(first_free_wave(&[0, 1], &[2]), 3);
        assert_eq!(first_free_wave(&[0, 2], &[1]), 3);
        assert_eq!(first_free_wave(&[1], &[2]), 0);
    }
}
