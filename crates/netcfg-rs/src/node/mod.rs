// crates/netcfg-rs/src/node/mod.rs

pub mod cache;
pub mod properties;

pub use cache::{CheckCache, CheckKey, DataPoolCheck};
pub use properties::{Application, HardwareConfig, NodeProperties};

use crate::can::{CanProtocol, Message, MessageCheck, ProtocolType, Signal};
use crate::config::{NodeConfig, is_valid_identifier};
use crate::datapool::{DataPool, DataPoolKind, ListElement};
use crate::log::{ComContext, nc_debug, nc_error, nc_trace};
use crate::sync::SyncEngine;
use crate::types::{CanMessageId, Direction};
use crate::NetCfgError;
use alloc::vec::Vec;
use log::{debug, error, trace};

/// Addresses one message inside a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageIdentification {
    pub protocol: ProtocolType,
    pub data_pool_index: usize,
    pub interface: usize,
    pub direction: Direction,
    pub message_index: usize,
}

impl MessageIdentification {
    pub fn new(
        protocol: ProtocolType,
        data_pool_index: usize,
        interface: usize,
        direction: Direction,
        message_index: usize,
    ) -> Self {
        Self {
            protocol,
            data_pool_index,
            interface,
            direction,
            message_index,
        }
    }

    /// The same container slot with a different message index.
    pub fn with_message_index(self, message_index: usize) -> Self {
        Self { message_index, ..self }
    }

    fn is_in(&self, protocol: &CanProtocol, interface: usize, direction: Direction) -> bool {
        self.protocol == protocol.protocol_type
            && self.data_pool_index == protocol.data_pool_index
            && self.interface == interface
            && self.direction == direction
    }
}

/// New position of a data pool reference after the pool at `source` moved to `target`.
fn remap_moved_index(index: usize, source: usize, target: usize) -> usize {
    if index == source {
        target
    } else if source < target && index > source && index <= target {
        index - 1
    } else if target < source && index >= target && index < source {
        index + 1
    } else {
        index
    }
}

/// A configurable device: its data pools, the protocols linking CAN messages
/// to communication data pools, and the applications owning pools.
///
/// All structural edits of message topology go through the node, which
/// resolves the container and the list pair involved, delegates to a
/// [`SyncEngine`] and drops memoized check results.
#[derive(Debug, Clone)]
pub struct Node {
    pub properties: NodeProperties,
    pub hardware: HardwareConfig,
    data_pools: Vec<DataPool>,
    protocols: Vec<CanProtocol>,
    applications: Vec<Application>,
    config: NodeConfig,
    check_cache: CheckCache,
}

impl Default for Node {
    fn default() -> Self {
        Self::with_config(NodeProperties::default(), NodeConfig::default())
    }
}

impl Node {
    pub fn new(properties: NodeProperties) -> Self {
        Self::with_config(properties, NodeConfig::default())
    }

    pub fn with_config(properties: NodeProperties, config: NodeConfig) -> Self {
        Self {
            properties,
            hardware: HardwareConfig::default(),
            data_pools: Vec::new(),
            protocols: Vec::new(),
            applications: Vec::new(),
            config,
            check_cache: CheckCache::new(config.check_cache_capacity),
        }
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn check_cache(&self) -> &CheckCache {
        &self.check_cache
    }

    // --- Data Pools ---

    pub fn data_pools(&self) -> &[DataPool] {
        &self.data_pools
    }

    pub fn data_pool(&self, index: usize) -> Option<&DataPool> {
        self.data_pools.get(index)
    }

    /// Mutable access for value and metadata edits.
    ///
    /// Communication lists must keep one element per signal; change their
    /// length only through the message and signal operations.
    pub fn data_pool_mut(&mut self, index: usize) -> Option<&mut DataPool> {
        self.check_cache.clear();
        self.data_pools.get_mut(index)
    }

    /// Inserts a data pool at `index` (`0..=len`), shifting every protocol and
    /// application reference at or above `index`.
    pub fn insert_data_pool(&mut self, index: usize, pool: DataPool) -> Result<(), NetCfgError> {
        if index > self.data_pools.len() {
            return Err(NetCfgError::Range("data pool index"));
        }
        self.data_pools.insert(index, pool);
        for protocol in &mut self.protocols {
            if protocol.data_pool_index >= index {
                protocol.data_pool_index += 1;
            }
        }
        for application in &mut self.applications {
            for dp in &mut application.data_pool_indices {
                if *dp >= index {
                    *dp += 1;
                }
            }
        }
        self.check_cache.clear();
        trace!("Inserted data pool {} on node '{}'", index, self.properties.name);
        Ok(())
    }

    /// Removes a data pool together with the protocols linked to it.
    pub fn delete_data_pool(&mut self, index: usize) -> Result<DataPool, NetCfgError> {
        if index >= self.data_pools.len() {
            return Err(NetCfgError::Range("data pool index"));
        }
        let pool = self.data_pools.remove(index);
        self.protocols.retain(|p| p.data_pool_index != index);
        for protocol in &mut self.protocols {
            if protocol.data_pool_index > index {
                protocol.data_pool_index -= 1;
            }
        }
        for application in &mut self.applications {
            application.data_pool_indices.retain(|dp| *dp != index);
            for dp in &mut application.data_pool_indices {
                if *dp > index {
                    *dp -= 1;
                }
            }
        }
        self.check_cache.clear();
        trace!("Deleted data pool {} '{}' on node '{}'", index, pool.name, self.properties.name);
        Ok(pool)
    }

    /// Moves the data pool at `source` to `target`, remapping all references.
    pub fn move_data_pool(&mut self, source: usize, target: usize) -> Result<(), NetCfgError> {
        let len = self.data_pools.len();
        if source >= len || target >= len {
            return Err(NetCfgError::Range("data pool index"));
        }
        let pool = self.data_pools.remove(source);
        self.data_pools.insert(target, pool);
        for protocol in &mut self.protocols {
            protocol.data_pool_index = remap_moved_index(protocol.data_pool_index, source, target);
        }
        for application in &mut self.applications {
            for dp in &mut application.data_pool_indices {
                *dp = remap_moved_index(*dp, source, target);
            }
        }
        self.check_cache.clear();
        Ok(())
    }

    /// Assigns NVM addresses in every data pool.
    pub fn recalculate_addresses(&mut self) -> Result<(), NetCfgError> {
        self.check_cache.clear();
        for (index, pool) in self.data_pools.iter_mut().enumerate() {
            if let Err(e) = pool.recalculate_address() {
                error!("Data pool {} '{}' does not fit NVM: {}", index, pool.name, e);
                return Err(e);
            }
        }
        Ok(())
    }

    // --- Protocols ---

    pub fn protocols(&self) -> &[CanProtocol] {
        &self.protocols
    }

    /// Links `protocol_type` to the communication data pool at `data_pool_index`.
    ///
    /// The pool must hold a (Tx, Rx) list pair for every CAN interface.
    pub fn add_can_protocol(
        &mut self,
        protocol_type: ProtocolType,
        data_pool_index: usize,
    ) -> Result<(), NetCfgError> {
        let interfaces = self.properties.can_interface_count;
        let Some(pool) = self.data_pools.get(data_pool_index) else {
            return Err(NetCfgError::Range("data pool index"));
        };
        if pool.kind != DataPoolKind::Com || pool.com_interface_count() < interfaces {
            return Err(NetCfgError::NotFound("communication list pair"));
        }
        if self.can_protocol(protocol_type, data_pool_index).is_some() {
            return Err(NetCfgError::Range("protocol already linked to data pool"));
        }
        self.protocols
            .push(CanProtocol::new(protocol_type, data_pool_index, interfaces));
        self.check_cache.clear();
        Ok(())
    }

    pub fn can_protocol(&self, protocol_type: ProtocolType, data_pool_index: usize) -> Option<&CanProtocol> {
        self.protocols
            .iter()
            .find(|p| p.protocol_type == protocol_type && p.data_pool_index == data_pool_index)
    }

    /// The protocol whose messages are backed by the data pool at `data_pool_index`.
    pub fn related_can_protocol(&self, data_pool_index: usize) -> Option<&CanProtocol> {
        self.protocols
            .iter()
            .find(|p| p.data_pool_index == data_pool_index)
    }

    /// Indices of all data pools linked to `protocol_type`.
    pub fn com_data_pools(&self, protocol_type: ProtocolType) -> Vec<usize> {
        self.protocols
            .iter()
            .filter(|p| p.protocol_type == protocol_type)
            .map(|p| p.data_pool_index)
            .collect()
    }

    // --- Applications ---

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    /// Adds an application owning the data pools at `data_pool_indices`.
    pub fn add_application(
        &mut self,
        mut application: Application,
        data_pool_indices: Vec<usize>,
    ) -> Result<(), NetCfgError> {
        if data_pool_indices.iter().any(|dp| *dp >= self.data_pools.len()) {
            return Err(NetCfgError::Range("data pool index"));
        }
        application.data_pool_indices = data_pool_indices;
        self.applications.push(application);
        Ok(())
    }

    // --- Message Topology ---

    fn sync_engine<'a>(
        protocols: &'a mut [CanProtocol],
        data_pools: &'a mut [DataPool],
        protocol_type: ProtocolType,
        data_pool_index: usize,
        interface: usize,
    ) -> Result<SyncEngine<'a>, NetCfgError> {
        let protocol = protocols
            .iter_mut()
            .find(|p| p.protocol_type == protocol_type && p.data_pool_index == data_pool_index)
            .ok_or(NetCfgError::NotFound("protocol"))?;
        let container = protocol
            .container_mut(interface)
            .ok_or(NetCfgError::NotFound("message container"))?;
        let pool = data_pools
            .get_mut(data_pool_index)
            .ok_or(NetCfgError::NotFound("data pool"))?;
        let access = pool.default_access();
        let (tx_list, rx_list) = pool.com_lists_mut(interface)?;
        Ok(SyncEngine::new(container, tx_list, rx_list, access))
    }

    /// Runs one structural edit on the container and lists addressed by `target`.
    fn edit<R>(
        &mut self,
        target: &MessageIdentification,
        action: &str,
        op: impl FnOnce(&mut SyncEngine<'_>) -> Result<R, NetCfgError>,
    ) -> Result<R, NetCfgError> {
        let ctx = ComContext {
            node: &self.properties.name,
            protocol: target.protocol,
            interface: target.interface,
            direction: target.direction,
        };
        let result = Self::sync_engine(
            &mut self.protocols,
            &mut self.data_pools,
            target.protocol,
            target.data_pool_index,
            target.interface,
        )
        .and_then(|mut engine| op(&mut engine));
        match &result {
            Ok(_) => {
                self.check_cache.clear();
                nc_trace!(ctx, "{} of message {} done", action, target.message_index);
            }
            Err(e) => nc_error!(ctx, "{} of message {} rejected: {}", action, target.message_index, e),
        }
        result
    }

    pub fn message(&self, id: &MessageIdentification) -> Option<&Message> {
        self.can_protocol(id.protocol, id.data_pool_index)?
            .container(id.interface)?
            .message(id.direction, id.message_index)
    }

    /// Inserts a message and one value element per signal at `id`.
    pub fn insert_message(
        &mut self,
        id: &MessageIdentification,
        message: Message,
        elements: Vec<ListElement>,
    ) -> Result<(), NetCfgError> {
        self.edit(id, "Insert", |engine| {
            engine.insert_message(id.direction, id.message_index, message, elements)
        })
    }

    /// Replaces the message at `id`; a different `new_direction` moves it to
    /// the end of that direction.
    pub fn set_message(
        &mut self,
        id: &MessageIdentification,
        new_direction: Direction,
        message: Message,
        elements: Vec<ListElement>,
    ) -> Result<(), NetCfgError> {
        self.edit(id, "Set", |engine| {
            engine.set_message(id.direction, id.message_index, new_direction, message, elements)
        })
    }

    pub fn delete_message(
        &mut self,
        id: &MessageIdentification,
    ) -> Result<(Message, Vec<ListElement>), NetCfgError> {
        self.edit(id, "Delete", |engine| {
            engine.delete_message(id.direction, id.message_index)
        })
    }

    pub fn insert_signal(
        &mut self,
        id: &MessageIdentification,
        signal_index: usize,
        signal: Signal,
        element: ListElement,
    ) -> Result<(), NetCfgError> {
        self.edit(id, "Signal insert", |engine| {
            engine.insert_signal(id.direction, id.message_index, signal_index, signal, element)
        })
    }

    pub fn set_signal(
        &mut self,
        id: &MessageIdentification,
        signal_index: usize,
        signal: Signal,
        element: ListElement,
    ) -> Result<(), NetCfgError> {
        self.edit(id, "Signal set", |engine| {
            engine.set_signal(id.direction, id.message_index, signal_index, signal, element)
        })
    }

    pub fn set_signal_position(
        &mut self,
        id: &MessageIdentification,
        signal_index: usize,
        position: &Signal,
    ) -> Result<(), NetCfgError> {
        self.edit(id, "Signal move", |engine| {
            engine.set_signal_position(id.direction, id.message_index, signal_index, position)
        })
    }

    pub fn set_signal_mux_value(
        &mut self,
        id: &MessageIdentification,
        signal_index: usize,
        multiplex_value: u16,
    ) -> Result<(), NetCfgError> {
        self.edit(id, "Multiplex value change", |engine| {
            engine.set_signal_mux_value(id.direction, id.message_index, signal_index, multiplex_value)
        })
    }

    pub fn delete_signal(
        &mut self,
        id: &MessageIdentification,
        signal_index: usize,
    ) -> Result<(Signal, ListElement), NetCfgError> {
        self.edit(id, "Signal delete", |engine| {
            engine.delete_signal(id.direction, id.message_index, signal_index)
        })
    }

    // --- Consistency Checks ---

    /// Every message of every protocol on `interface`, in both directions,
    /// with its identification.
    fn interface_messages(
        &self,
        interface: usize,
    ) -> impl Iterator<Item = (MessageIdentification, &Message)> + '_ {
        self.protocols.iter().flat_map(move |protocol| {
            protocol
                .container(interface)
                .into_iter()
                .flat_map(move |container| {
                    [Direction::Tx, Direction::Rx].into_iter().flat_map(move |direction| {
                        container
                            .messages(direction)
                            .iter()
                            .enumerate()
                            .map(move |(index, message)| {
                                (
                                    MessageIdentification::new(
                                        protocol.protocol_type,
                                        protocol.data_pool_index,
                                        interface,
                                        direction,
                                        index,
                                    ),
                                    message,
                                )
                            })
                    })
                })
        })
    }

    /// Returns `true` if `id` is a valid CAN id that no message on
    /// `interface` other than `exclude` uses.
    ///
    /// All protocols and both directions share one id space per interface.
    /// Ids collide only if numeric value and frame format are both equal.
    pub fn check_message_id(
        &self,
        interface: usize,
        id: CanMessageId,
        exclude: Option<&MessageIdentification>,
    ) -> bool {
        if !id.is_valid() {
            return false;
        }
        let duplicate = self
            .interface_messages(interface)
            .find(|(ident, message)| Some(ident) != exclude && message.can_id == id);
        if let Some((ident, _)) = duplicate {
            debug!(
                "CAN id {} on interface {} already used by {:?}",
                id, interface, ident
            );
            return false;
        }
        true
    }

    /// Returns `true` if `name` is a valid identifier that no message on
    /// `interface` other than `exclude` uses (case-insensitive).
    pub fn check_message_name(
        &self,
        interface: usize,
        name: &str,
        exclude: Option<&MessageIdentification>,
    ) -> bool {
        if !is_valid_identifier(name, self.config.max_name_len) {
            return false;
        }
        let duplicate = self.interface_messages(interface).any(|(ident, message)| {
            Some(&ident) != exclude && message.name.eq_ignore_ascii_case(name)
        });
        if duplicate {
            debug!("Message name '{}' on interface {} is not unique", name, interface);
        }
        !duplicate
    }

    /// Checks the message at `id` on its own and against its neighbours.
    pub fn check_message_local_errors(
        &self,
        id: &MessageIdentification,
    ) -> Result<MessageCheck, NetCfgError> {
        let container = self
            .can_protocol(id.protocol, id.data_pool_index)
            .ok_or(NetCfgError::NotFound("protocol"))?
            .container(id.interface)
            .ok_or(NetCfgError::NotFound("message container"))?;
        let check = container.check_message_local_errors(
            id.direction,
            id.message_index,
            self.config.max_name_len,
        )?;
        if !check.is_ok() {
            let ctx = ComContext {
                node: &self.properties.name,
                protocol: id.protocol,
                interface: id.interface,
                direction: id.direction,
            };
            nc_debug!(ctx, "Message {} has errors: {:?}", id.message_index, check);
        }
        Ok(check)
    }

    fn data_pool_check_key(&self, index: usize) -> Option<CheckKey> {
        let pool = self.data_pools.get(index)?;
        let mut hasher = crc32fast::Hasher::new();
        hasher.update(&(self.config.max_name_len as u32).to_le_bytes());
        pool.calc_hash(&mut hasher);
        for other in &self.data_pools {
            hasher.update(other.name.as_bytes());
            hasher.update(&[0]);
        }
        Some((index, hasher.finalize()))
    }

    /// Checks the data pool at `index`: its name against the other pools,
    /// and every list's name and elements.
    ///
    /// Results are memoized in the node's [`CheckCache`].
    pub fn check_error_data_pool(&mut self, index: usize) -> Result<DataPoolCheck, NetCfgError> {
        let key = self
            .data_pool_check_key(index)
            .ok_or(NetCfgError::Range("data pool index"))?;
        if let Some(hit) = self.check_cache.get(key) {
            trace!("Data pool {} check served from cache", index);
            return Ok(hit.clone());
        }

        let max_name_len = self.config.max_name_len;
        let pool = &self.data_pools[index];
        let mut check = DataPoolCheck {
            name_conflict: self
                .data_pools
                .iter()
                .enumerate()
                .any(|(i, other)| i != index && other.name.eq_ignore_ascii_case(&pool.name)),
            name_invalid: !is_valid_identifier(&pool.name, max_name_len),
            lists_invalid: Vec::new(),
        };
        for (i, list) in pool.lists.iter().enumerate() {
            let name_clash = pool
                .lists
                .iter()
                .enumerate()
                .any(|(j, other)| j != i && other.name.eq_ignore_ascii_case(&list.name));
            let invalid = name_clash
                || !is_valid_identifier(&list.name, max_name_len)
                || !list
                    .check_error_elements(max_name_len, pool.kind.uses_nvm())
                    .is_ok();
            if invalid {
                check.lists_invalid.push(i);
            }
        }
        if !check.is_ok() {
            debug!("Data pool {} '{}' has errors: {:?}", index, pool.name, check);
        }
        self.check_cache.insert(key, check.clone());
        Ok(check)
    }

    /// Returns `true` if every container's cached signal indices match its
    /// topology and every communication list pair holds one element per signal.
    pub fn verify_element_indices(&self) -> bool {
        self.protocols.iter().all(|protocol| {
            let pool = self.data_pools.get(protocol.data_pool_index);
            protocol.containers.iter().enumerate().all(|(interface, container)| {
                container.verify_element_indices()
                    && [Direction::Tx, Direction::Rx].into_iter().all(|direction| {
                        pool.and_then(|p| p.com_list(interface, direction))
                            .is_some_and(|l| l.len() == container.signal_count(direction))
                    })
            })
        })
    }

    /// Structural hash over properties, protocols, data pools, applications
    /// and hardware configuration.
    pub fn calc_hash(&self) -> u32 {
        let mut hasher = crc32fast::Hasher::new();
        self.properties.calc_hash(&mut hasher);
        for protocol in &self.protocols {
            protocol.calc_hash(&mut hasher);
        }
        for pool in &self.data_pools {
            pool.calc_hash(&mut hasher);
        }
        for application in &self.applications {
            application.calc_hash(&mut hasher);
        }
        self.hardware.calc_hash(&mut hasher);
        hasher.finalize()
    }
}
