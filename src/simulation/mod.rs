pub mod config;
pub use config::SimConfig;

use crate::agent::Agent;
use crate::error::SimError;
use crate::metrics::{round2, AgentSample, TimestepRecord};
use crate::strategies::{PathLoads, Strategy, StrategyKind};
use crate::topology::Topology;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::HashSet;
use tracing::{debug, info};

/// Drives the timestep loop: aggregate loads, determine congestion and
/// loss, update every agent, emit one record. Owns the topology, the agent
/// population, the strategy state, and the run's rng stream.
pub struct Simulator {
    config: SimConfig,
    topology: Topology,
    strategy: Box<dyn Strategy>,
    agents: Vec<Agent>,
    rng: StdRng,
    records: Vec<TimestepRecord>,
}

impl Simulator {
    /// Fails before the first timestep on an unknown strategy name, an
    /// invalid agent count or duration, or an empty topology (the topology
    /// constructor has already rejected that case).
    pub fn new(topology: Topology, config: SimConfig) -> Result<Self, SimError> {
        config.validate()?;
        let kind: StrategyKind = config.strategy_name.parse()?;
        let strategy = kind.build(config.epsilon);

        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let agents = (0..config.num_agents)
            .map(|id| Agent::spawn(id, &topology, &mut rng))
            .collect();

        Ok(Self {
            records: Vec::with_capacity(config.duration as usize),
            config,
            topology,
            strategy,
            agents,
            rng,
        })
    }

    pub fn run(&mut self) -> Result<(), SimError> {
        info!(
            strategy = %self.strategy.name(),
            agents = self.config.num_agents,
            duration = self.config.duration,
            "starting simulation '{}'",
            self.config.name
        );

        for t in 0..self.config.duration {
            self.step(t)?;
        }

        let last = self.records.last();
        debug!(
            final_throughput = last.map(|r| r.total_throughput).unwrap_or(0.0),
            final_loss = last.map(|r| r.total_loss).unwrap_or(0.0),
            "simulation '{}' finished",
            self.config.name
        );
        Ok(())
    }

    /// One timestep. The four stages run strictly in order with a barrier
    /// between them; within stage 3 every agent sees the stage-1 snapshot,
    /// never the partially updated state of agents processed before it.
    fn step(&mut self, t: u64) -> Result<(), SimError> {
        // stage 1: aggregate load per path from start-of-step assignments
        let mut loads = PathLoads::with_capacity(self.topology.len());
        for path in self.topology.paths() {
            loads.insert(path.id.clone(), 0.0);
        }
        for agent in &self.agents {
            *loads.entry(agent.current_path.clone()).or_insert(0.0) += agent.cwnd;
        }

        // stage 2: congestion set and per-path loss
        let mut congested: HashSet<&str> = HashSet::new();
        let mut path_loss = Vec::with_capacity(self.topology.len());
        for path in self.topology.paths() {
            let load = loads.get(&path.id).copied().unwrap_or(0.0);
            let loss = if load > path.capacity_mbps {
                congested.insert(path.id.as_str());
                load - path.capacity_mbps
            } else {
                0.0
            };
            path_loss.push((path.id.clone(), round2(loss)));
        }

        // stage 3: AIMD update then reselection, same snapshot for everyone
        for agent in self.agents.iter_mut() {
            let hit = congested.contains(agent.current_path.as_str());
            agent.update_cwnd(hit);
            agent.choose_new_path(self.strategy.as_mut(), &self.topology, &loads, &mut self.rng)?;
        }

        // stage 4: record the step
        let total_loss = round2(path_loss.iter().map(|(_, loss)| loss).sum());
        let record = TimestepRecord {
            timestep: t,
            total_throughput: self.agents.iter().map(|a| a.cwnd).sum(),
            agents: self
                .agents
                .iter()
                .map(|a| AgentSample {
                    id: a.id,
                    path: a.current_path.clone(),
                    cwnd: round2(a.cwnd),
                })
                .collect(),
            path_loads: self
                .topology
                .paths()
                .iter()
                .map(|p| (p.id.clone(), round2(loads.get(&p.id).copied().unwrap_or(0.0))))
                .collect(),
            path_loss,
            total_loss,
        };
        self.records.push(record);
        Ok(())
    }

    pub fn records(&self) -> &[TimestepRecord] {
        &self.records
    }

    pub fn into_records(self) -> Vec<TimestepRecord> {
        self.records
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }
}
