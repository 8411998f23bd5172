// ── Shape contracts ──
//
// One JSON-Schema document describes every fragment the exporters emit
// and the assembled document. Validators are compiled on first use and
// shared for the life of the process.

use std::collections::HashMap;

use jsonschema::Validator;
use once_cell::sync::OnceCell;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::ContractError;

const SCHEMA: &str = include_str!("../contracts/sing-box.schema.json");

static CONTRACTS: OnceCell<Contracts> = OnceCell::new();

/// A published shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum Contract {
    Inbound,
    Outbound,
    Endpoint,
    RouteRule,
    RuleSet,
    DnsServer,
    DnsRule,
    Document,
}

impl Contract {
    pub const ALL: [Self; 8] = [
        Self::Inbound,
        Self::Outbound,
        Self::Endpoint,
        Self::RouteRule,
        Self::RuleSet,
        Self::DnsServer,
        Self::DnsRule,
        Self::Document,
    ];
}

/// Why a value failed its contract check.
#[derive(Debug, Clone)]
pub enum ContractViolation {
    /// The contract itself could not be compiled.
    Unavailable(ContractError),
    /// The value does not match the shape.
    Invalid { detail: String },
}

struct Contracts {
    validators: HashMap<Contract, Validator>,
}

impl Contracts {
    fn compile() -> Result<Self, ContractError> {
        let root: Value = serde_json::from_str(SCHEMA).map_err(|err| ContractError {
            contract: "sing-box".into(),
            detail: err.to_string(),
        })?;
        let defs = root.get("$defs").cloned().ok_or_else(|| ContractError {
            contract: "sing-box".into(),
            detail: "schema has no $defs".into(),
        })?;
        let dialect = root.get("$schema").cloned().unwrap_or(Value::Null);

        let mut validators = HashMap::with_capacity(Contract::ALL.len());
        for contract in Contract::ALL {
            let schema = json!({
                "$schema": dialect,
                "$defs": defs,
                "$ref": format!("#/$defs/{contract}"),
            });
            let validator = Validator::new(&schema).map_err(|err| ContractError {
                contract: contract.to_string(),
                detail: err.to_string(),
            })?;
            validators.insert(contract, validator);
        }
        Ok(Self { validators })
    }
}

/// Check a serializable value against a contract.
pub fn check<T: Serialize + ?Sized>(contract: Contract, value: &T) -> Result<(), ContractViolation> {
    let contracts = CONTRACTS
        .get_or_try_init(Contracts::compile)
        .map_err(ContractViolation::Unavailable)?;
    let validator = contracts.validators.get(&contract).ok_or_else(|| {
        ContractViolation::Unavailable(ContractError {
            contract: contract.to_string(),
            detail: "not compiled".into(),
        })
    })?;

    let instance = serde_json::to_value(value).map_err(|err| ContractViolation::Invalid {
        detail: format!("not representable as JSON: {err}"),
    })?;

    validator
        .validate(&instance)
        .map_err(|err| ContractViolation::Invalid {
            detail: err.to_string(),
        })
}
