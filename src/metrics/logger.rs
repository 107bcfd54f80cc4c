use super::{AgentSample, TimestepRecord};
use anyhow::{bail, Context, Result};
use csv::Writer;
use std::fs::File;
use std::path::Path;

/// Writes a record sequence as a CSV result log. The header is dynamic:
/// `timestep,total_throughput,agent_{id}_path,agent_{id}_cwnd,...,
/// {path}_load,...,{path}_loss,...,total_loss`.
pub struct RecordLogger {
    writer: Writer<File>,
}

impl RecordLogger {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let writer = Writer::from_path(path)?;
        Ok(Self { writer })
    }

    pub fn log_all(&mut self, records: &[TimestepRecord]) -> Result<()> {
        let Some(first) = records.first() else {
            return Ok(());
        };
        self.writer.write_record(header_for(first))?;
        for record in records {
            self.writer.write_record(row_for(record))?;
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn header_for(record: &TimestepRecord) -> Vec<String> {
    let mut header = vec!["timestep".to_string(), "total_throughput".to_string()];
    for agent in &record.agents {
        header.push(format!("agent_{}_path", agent.id));
        header.push(format!("agent_{}_cwnd", agent.id));
    }
    for (id, _) in &record.path_loads {
        header.push(format!("{id}_load"));
    }
    for (id, _) in &record.path_loss {
        header.push(format!("{id}_loss"));
    }
    header.push("total_loss".to_string());
    header
}

fn row_for(record: &TimestepRecord) -> Vec<String> {
    let mut row = vec![
        record.timestep.to_string(),
        record.total_throughput.to_string(),
    ];
    for agent in &record.agents {
        row.push(agent.path.clone());
        row.push(agent.cwnd.to_string());
    }
    for (_, load) in &record.path_loads {
        row.push(load.to_string());
    }
    for (_, loss) in &record.path_loss {
        row.push(loss.to_string());
    }
    row.push(record.total_loss.to_string());
    row
}

enum Column {
    Timestep,
    TotalThroughput,
    AgentPath(u32),
    AgentCwnd(u32),
    PathLoad(String),
    PathLoss(String),
    TotalLoss,
}

fn classify(name: &str) -> Result<Column> {
    match name {
        "timestep" => return Ok(Column::Timestep),
        "total_throughput" => return Ok(Column::TotalThroughput),
        "total_loss" => return Ok(Column::TotalLoss),
        _ => {}
    }
    if let Some(rest) = name.strip_prefix("agent_") {
        if let Some(id) = rest.strip_suffix("_path") {
            return Ok(Column::AgentPath(id.parse()?));
        }
        if let Some(id) = rest.strip_suffix("_cwnd") {
            return Ok(Column::AgentCwnd(id.parse()?));
        }
    }
    if let Some(id) = name.strip_suffix("_load") {
        return Ok(Column::PathLoad(id.to_string()));
    }
    if let Some(id) = name.strip_suffix("_loss") {
        return Ok(Column::PathLoss(id.to_string()));
    }
    bail!("unrecognized result column: {name}")
}

/// Reads a result log back into records, reconstructing the agent and path
/// layout from the header. Used by the analyze command.
pub fn read_records(path: impl AsRef<Path>) -> Result<Vec<TimestepRecord>> {
    let path = path.as_ref();
    let mut reader =
        csv::Reader::from_path(path).with_context(|| format!("opening {}", path.display()))?;
    let columns: Vec<Column> = reader
        .headers()?
        .iter()
        .map(classify)
        .collect::<Result<_>>()?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        if row.len() != columns.len() {
            bail!("row width {} does not match header {}", row.len(), columns.len());
        }

        let mut record = TimestepRecord {
            timestep: 0,
            total_throughput: 0.0,
            agents: Vec::new(),
            path_loads: Vec::new(),
            path_loss: Vec::new(),
            total_loss: 0.0,
        };
        for (column, value) in columns.iter().zip(row.iter()) {
            match column {
                Column::Timestep => record.timestep = value.parse()?,
                Column::TotalThroughput => record.total_throughput = value.parse()?,
                Column::TotalLoss => record.total_loss = value.parse()?,
                Column::AgentPath(id) => record.agents.push(AgentSample {
                    id: *id,
                    path: value.to_string(),
                    cwnd: 0.0,
                }),
                Column::AgentCwnd(id) => {
                    let sample = record
                        .agents
                        .iter_mut()
                        .find(|a| a.id == *id)
                        .with_context(|| format!("cwnd column for unseen agent {id}"))?;
                    sample.cwnd = value.parse()?;
                }
                Column::PathLoad(id) => record.path_loads.push((id.clone(), value.parse()?)),
                Column::PathLoss(id) => record.path_loss.push((id.clone(), value.parse()?)),
            }
        }
        records.push(record);
    }
    Ok(records)
}
