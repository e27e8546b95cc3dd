//! Target list parsing and resolution.
//!
//! A request names its targets as a comma-separated list of decimal
//! device addresses. The global address anywhere in the list means
//! "every configured device" and overrides the rest of the list.
//! Resolution groups the surviving targets by (network, model) so that
//! one frame can carry a command to every co-located device of the same
//! hardware type.

use marquee_fleet::Fleet;
use marquee_protocol::HardwareModel;

use crate::error::DispatchError;

/// Targets on one network that share a hardware model, and so can share
/// an encoded command and a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetGroup {
    /// Network the devices hang off of.
    pub network_id: String,
    /// Hardware model shared by every address in the group.
    pub model: HardwareModel,
    /// Device addresses, in the order first seen.
    pub addresses: Vec<u8>,
}

/// The outcome of resolving a target list against the fleet.
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// Groups to dispatch to.
    pub groups: Vec<TargetGroup>,
    /// Whether the request used the global address.
    pub is_global: bool,
    /// Addresses that named no configured device. They are skipped, not
    /// fatal; the count feeds the dispatch report.
    pub unknown: usize,
}

/// Parse a raw target list. Returns the addresses plus a flag for the
/// global short-circuit.
///
/// Every malformed entry is reported. A well-formed list containing the
/// global address collapses to just that address.
pub fn parse_targets(spec: &str, global_address: u8) -> Result<(Vec<u8>, bool), DispatchError> {
    if spec.trim().is_empty() {
        return Err(DispatchError::MissingTargets);
    }

    let mut targets = Vec::new();
    let mut problems = Vec::new();
    let mut is_global = false;
    for (index, entry) in spec.split(',').enumerate() {
        match entry.trim().parse::<i64>() {
            Err(_) => problems.push(format!("target #{index} {entry:?} is not a number")),
            Ok(t) if !(0..=63).contains(&t) => {
                problems.push(format!("target #{index} value {t} out of range [0,63]"))
            }
            Ok(t) => {
                if t as u8 == global_address {
                    is_global = true;
                }
                targets.push(t as u8);
            }
        }
    }
    if !problems.is_empty() {
        return Err(DispatchError::InvalidTargets { problems });
    }
    if is_global {
        return Ok((vec![global_address], true));
    }
    Ok((targets, false))
}

/// Resolve a raw target list against the fleet, grouping by (network,
/// model).
pub fn resolve(fleet: &Fleet, spec: &str) -> Result<Resolution, DispatchError> {
    let (targets, is_global) = parse_targets(spec, fleet.global_address())?;

    let mut resolution = Resolution {
        is_global,
        ..Resolution::default()
    };

    if is_global {
        for device in fleet.devices() {
            add_target(
                &mut resolution.groups,
                &device.network_id,
                device.model,
                device.address,
            );
        }
        return Ok(resolution);
    }

    for address in targets {
        match fleet.device(address) {
            Some(device) => add_target(
                &mut resolution.groups,
                &device.network_id,
                device.model,
                device.address,
            ),
            None => {
                tracing::warn!(address, "target device is not configured, skipping");
                resolution.unknown += 1;
            }
        }
    }
    Ok(resolution)
}

fn add_target(groups: &mut Vec<TargetGroup>, network_id: &str, model: HardwareModel, address: u8) {
    if let Some(group) = groups
        .iter_mut()
        .find(|g| g.network_id == network_id && g.model == model)
    {
        if !group.addresses.contains(&address) {
            group.addresses.push(address);
        }
        return;
    }
    groups.push(TargetGroup {
        network_id: network_id.to_string(),
        model,
        addresses: vec![address],
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_lists() {
        assert_eq!(parse_targets("1,2,40", 15).unwrap(), (vec![1, 2, 40], false));
        assert_eq!(parse_targets(" 7 ", 15).unwrap(), (vec![7], false));
    }

    #[test]
    fn global_address_collapses_the_list() {
        assert_eq!(parse_targets("1,15,2", 15).unwrap(), (vec![15], true));
        assert_eq!(parse_targets("15", 15).unwrap(), (vec![15], true));
    }

    #[test]
    fn all_bad_entries_are_reported() {
        let err = parse_targets("1,x,99,2", 15).unwrap_err();
        match err {
            DispatchError::InvalidTargets { problems } => {
                assert_eq!(problems.len(), 2);
                assert!(problems[0].contains("#1"));
                assert!(problems[1].contains("99"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn empty_list_is_an_error() {
        assert!(matches!(
            parse_targets("", 15),
            Err(DispatchError::MissingTargets)
        ));
        assert!(matches!(
            parse_targets("  ", 15),
            Err(DispatchError::MissingTargets)
        ));
    }
}
