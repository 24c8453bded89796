//! Magistrate kinds (type group 2): business and bridgechain registries.

use std::collections::HashSet;
use std::net::IpAddr;

use indexmap::IndexMap;

use super::{
    asset, count_u8, read_optional_string, read_short_string, write_optional_string,
    write_short_string,
};
use crate::config::{HASH_LENGTH, MAGISTRATE_TYPE_GROUP};
use crate::transaction::asset::{
    BridgechainRegistrationAsset, BridgechainResignationAsset, BusinessRegistrationAsset,
};
use crate::transaction::cursor::BinaryCursor;
use crate::transaction::data::TransactionData;
use crate::transaction::error::TransactionError;
use crate::transaction::schema::{is_hex, Bounds, Schema, SchemaContext, Violations};
use crate::transaction::types::MagistrateTransactionType;
use crate::transaction::variant::TransactionVariant;

/// Names: 1-40 chars, alphanumerics separated by single spaces, dots,
/// dashes or underscores.
fn is_generic_name(value: &str) -> bool {
    let bytes = value.as_bytes();
    let separator = |b: &u8| b" ._-".contains(b);
    (1..=40).contains(&value.len())
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || separator(b))
        && bytes.first().is_some_and(u8::is_ascii_alphanumeric)
        && !bytes.windows(2).any(|pair| separator(&pair[0]) && separator(&pair[1]))
}

fn is_uri(value: &str) -> bool {
    (value.starts_with("https://") || value.starts_with("http://"))
        && value.len() <= 80
        && !value.contains(char::is_whitespace)
}

// ---------------------------------------------------------------------------
// Business registration
// ---------------------------------------------------------------------------

/// Payload: name, website, vat (0 = absent), repository (0 = absent),
/// each as u8 length + UTF-8.
#[derive(Debug, Clone, Copy)]
pub struct BusinessRegistration;

fn check_business(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    let Some(business) = data
        .asset
        .as_ref()
        .and_then(|asset| asset.business_registration.as_ref())
    else {
        out.push("asset.businessRegistration", "is required");
        return;
    };
    if !is_generic_name(&business.name) {
        out.push("asset.businessRegistration.name", "must be a 1-40 char name");
    }
    if !is_uri(&business.website) {
        out.push("asset.businessRegistration.website", "must be an http(s) URI");
    }
    if let Some(vat) = &business.vat {
        if !(8..=15).contains(&vat.len()) || !vat.bytes().all(|b| b.is_ascii_alphanumeric()) {
            out.push("asset.businessRegistration.vat", "must be 8-15 alphanumerics");
        }
    }
    if let Some(repository) = &business.repository {
        if !is_uri(repository) {
            out.push("asset.businessRegistration.repository", "must be an http(s) URI");
        }
    }
}

impl TransactionVariant for BusinessRegistration {
    fn name(&self) -> &'static str {
        "businessRegistration"
    }

    fn transaction_type(&self) -> u16 {
        MagistrateTransactionType::BusinessRegistration.code()
    }

    fn type_group(&self) -> u32 {
        MAGISTRATE_TYPE_GROUP
    }

    fn schema(&self) -> Schema {
        Schema::new("businessRegistration")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_business)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let business = asset(data)?
            .business_registration
            .as_ref()
            .ok_or(TransactionError::MissingAsset("businessRegistration"))?;
        write_short_string(cursor, "asset.businessRegistration.name", &business.name)?;
        write_short_string(cursor, "asset.businessRegistration.website", &business.website)?;
        write_optional_string(cursor, "asset.businessRegistration.vat", business.vat.as_deref())?;
        write_optional_string(
            cursor,
            "asset.businessRegistration.repository",
            business.repository.as_deref(),
        )
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let name = read_short_string(cursor, "asset.businessRegistration.name")?;
        let website = read_short_string(cursor, "asset.businessRegistration.website")?;
        let vat = read_optional_string(cursor, "asset.businessRegistration.vat")?;
        let repository = read_optional_string(cursor, "asset.businessRegistration.repository")?;
        data.asset_mut().business_registration = Some(BusinessRegistrationAsset {
            name,
            website,
            vat,
            repository,
        });
        Ok(())
    }
}

/// No payload.
#[derive(Debug, Clone, Copy)]
pub struct BusinessResignation;

impl TransactionVariant for BusinessResignation {
    fn name(&self) -> &'static str {
        "businessResignation"
    }

    fn transaction_type(&self) -> u16 {
        MagistrateTransactionType::BusinessResignation.code()
    }

    fn type_group(&self) -> u32 {
        MAGISTRATE_TYPE_GROUP
    }

    fn schema(&self) -> Schema {
        Schema::new("businessResignation")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
    }

    fn serialize_asset(
        &self,
        _data: &TransactionData,
        _cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        Ok(())
    }

    fn deserialize_asset(
        &self,
        _data: &mut TransactionData,
        _cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bridgechain registration
// ---------------------------------------------------------------------------

/// Payload: name, u8 seed-node count + seed nodes, genesis hash (32),
/// repository, u8 port count + (name, u16 port) pairs. Strings are u8
/// length + UTF-8.
#[derive(Debug, Clone, Copy)]
pub struct BridgechainRegistration;

fn check_bridgechain(data: &TransactionData, _: &SchemaContext<'_>, out: &mut Violations) {
    let Some(chain) = data
        .asset
        .as_ref()
        .and_then(|asset| asset.bridgechain_registration.as_ref())
    else {
        out.push("asset.bridgechainRegistration", "is required");
        return;
    };
    if !is_generic_name(&chain.name) {
        out.push("asset.bridgechainRegistration.name", "must be a 1-40 char name");
    }
    if chain.seed_nodes.is_empty() || chain.seed_nodes.len() > 10 {
        out.push("asset.bridgechainRegistration.seedNodes", "must hold 1-10 nodes");
    }
    let unique: HashSet<&String> = chain.seed_nodes.iter().collect();
    if unique.len() != chain.seed_nodes.len() {
        out.push(
            "asset.bridgechainRegistration.seedNodes",
            "must not contain duplicates",
        );
    }
    if chain.seed_nodes.iter().any(|node| node.parse::<IpAddr>().is_err()) {
        out.push(
            "asset.bridgechainRegistration.seedNodes",
            "entries must be IP addresses",
        );
    }
    if !is_hex(&chain.genesis_hash, Some(HASH_LENGTH * 2)) {
        out.push("asset.bridgechainRegistration.genesisHash", "must be 64-char hex");
    }
    if !is_uri(&chain.bridgechain_repository) {
        out.push(
            "asset.bridgechainRegistration.bridgechainRepository",
            "must be an http(s) URI",
        );
    }
    if chain.ports.is_empty() || chain.ports.len() > 10 {
        out.push("asset.bridgechainRegistration.ports", "must hold 1-10 ports");
    }
}

impl TransactionVariant for BridgechainRegistration {
    fn name(&self) -> &'static str {
        "bridgechainRegistration"
    }

    fn transaction_type(&self) -> u16 {
        MagistrateTransactionType::BridgechainRegistration.code()
    }

    fn type_group(&self) -> u32 {
        MAGISTRATE_TYPE_GROUP
    }

    fn schema(&self) -> Schema {
        Schema::new("bridgechainRegistration")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_bridgechain)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let chain = asset(data)?
            .bridgechain_registration
            .as_ref()
            .ok_or(TransactionError::MissingAsset("bridgechainRegistration"))?;

        write_short_string(cursor, "asset.bridgechainRegistration.name", &chain.name)?;

        cursor.write_u8(count_u8(
            "asset.bridgechainRegistration.seedNodes",
            chain.seed_nodes.len(),
        )?)?;
        for node in &chain.seed_nodes {
            write_short_string(cursor, "asset.bridgechainRegistration.seedNodes", node)?;
        }

        cursor.write_hex(
            "asset.bridgechainRegistration.genesisHash",
            &chain.genesis_hash,
            Some(HASH_LENGTH),
        )?;
        write_short_string(
            cursor,
            "asset.bridgechainRegistration.bridgechainRepository",
            &chain.bridgechain_repository,
        )?;

        cursor.write_u8(count_u8("asset.bridgechainRegistration.ports", chain.ports.len())?)?;
        for (name, port) in &chain.ports {
            write_short_string(cursor, "asset.bridgechainRegistration.ports", name)?;
            cursor.write_u16_le(*port)?;
        }
        Ok(())
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let name = read_short_string(cursor, "asset.bridgechainRegistration.name")?;

        let node_count = cursor.read_u8()?;
        let seed_nodes = (0..node_count)
            .map(|_| read_short_string(cursor, "asset.bridgechainRegistration.seedNodes"))
            .collect::<Result<Vec<_>, _>>()?;

        let genesis_hash = cursor.read_hex(HASH_LENGTH)?;
        let bridgechain_repository =
            read_short_string(cursor, "asset.bridgechainRegistration.bridgechainRepository")?;

        let port_count = cursor.read_u8()?;
        let mut ports = IndexMap::with_capacity(port_count as usize);
        for _ in 0..port_count {
            let name = read_short_string(cursor, "asset.bridgechainRegistration.ports")?;
            let port = cursor.read_u16_le()?;
            ports.insert(name, port);
        }

        data.asset_mut().bridgechain_registration = Some(BridgechainRegistrationAsset {
            name,
            seed_nodes,
            genesis_hash,
            bridgechain_repository,
            ports,
        });
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Bridgechain resignation
// ---------------------------------------------------------------------------

/// Payload: bridgechain id (the 32-byte genesis hash).
#[derive(Debug, Clone, Copy)]
pub struct BridgechainResignation;

fn check_bridgechain_resignation(
    data: &TransactionData,
    _: &SchemaContext<'_>,
    out: &mut Violations,
) {
    match data
        .asset
        .as_ref()
        .and_then(|asset| asset.bridgechain_resignation.as_ref())
    {
        None => out.push("asset.bridgechainResignation", "is required"),
        Some(resignation) if !is_hex(&resignation.bridgechain_id, Some(HASH_LENGTH * 2)) => out
            .push(
                "asset.bridgechainResignation.bridgechainId",
                "must be 64-char hex",
            ),
        Some(_) => {}
    }
}

impl TransactionVariant for BridgechainResignation {
    fn name(&self) -> &'static str {
        "bridgechainResignation"
    }

    fn transaction_type(&self) -> u16 {
        MagistrateTransactionType::BridgechainResignation.code()
    }

    fn type_group(&self) -> u32 {
        MAGISTRATE_TYPE_GROUP
    }

    fn schema(&self) -> Schema {
        Schema::new("bridgechainResignation")
            .amount(Bounds::exactly(0))
            .fee(Bounds::at_least(1))
            .rule(check_bridgechain_resignation)
    }

    fn serialize_asset(
        &self,
        data: &TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let resignation = asset(data)?
            .bridgechain_resignation
            .as_ref()
            .ok_or(TransactionError::MissingAsset("bridgechainResignation"))?;
        cursor.write_hex(
            "asset.bridgechainResignation.bridgechainId",
            &resignation.bridgechain_id,
            Some(HASH_LENGTH),
        )
    }

    fn deserialize_asset(
        &self,
        data: &mut TransactionData,
        cursor: &mut BinaryCursor,
    ) -> Result<(), TransactionError> {
        let bridgechain_id = cursor.read_hex(HASH_LENGTH)?;
        data.asset_mut().bridgechain_resignation =
            Some(BridgechainResignationAsset { bridgechain_id });
        Ok(())
    }
}
