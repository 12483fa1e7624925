//! In-memory ledger
//!
//! Enforces the same transition rules as the remote arena ledger (authority
//! checks, round gating, double-score rejection, threshold pruning, genome
//! length checks) without a network. Each call takes the state lock once, so
//! a call either commits in full or leaves state untouched.
//!
//! Clones share state; [`InMemoryLedger::as_signer`] gives a view of the same
//! ledger that signs as another identity.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::debug;

use saea_common::{
    content_hash, derive_address, Agent, AgentHandle, Arena, GenomeDigest, Identity, LedgerError,
    Round, MAX_GENOME_LEN, MAX_MUTATION_RATE_BPS, MIN_MAX_AGENTS,
};

use crate::client::{LedgerClient, LedgerResult, TransactionId};
use crate::events::LedgerEvent;
use crate::fault::{Fault, FaultPlan};
use crate::fitness::{compute_fitness, round_seed};

/// Seed of the singleton arena account
pub const ARENA_SEED: &[u8] = b"arena";

/// Seed prefix of agent accounts
pub const AGENT_SEED: &[u8] = b"agent";

/// Address of the singleton arena account
pub fn arena_address() -> Identity {
    derive_address(&[ARENA_SEED])
}

/// Address of the agent registered by `owner` at slot `index`
pub fn agent_address(owner: &Identity, index: u64) -> AgentHandle {
    derive_address(&[
        AGENT_SEED,
        arena_address().as_bytes(),
        owner.as_bytes(),
        &index.to_le_bytes(),
    ])
}

#[derive(Debug, Default)]
struct LedgerState {
    arena: Option<Arena>,
    agents: HashMap<AgentHandle, Agent>,
    /// Handles in registration order
    registration_order: Vec<AgentHandle>,
    rounds: BTreeMap<u64, Round>,
    balances: HashMap<Identity, u64>,
    events: Vec<LedgerEvent>,
    tx_seq: u64,
}

impl LedgerState {
    fn arena(&self) -> LedgerResult<&Arena> {
        self.arena.as_ref().ok_or(LedgerError::ArenaNotFound)
    }

    fn arena_mut(&mut self) -> LedgerResult<&mut Arena> {
        self.arena.as_mut().ok_or(LedgerError::ArenaNotFound)
    }

    fn commit(&mut self, op: &str, event: Option<LedgerEvent>) -> TransactionId {
        self.tx_seq += 1;
        let mut hasher = blake3::Hasher::new();
        hasher.update(&self.tx_seq.to_le_bytes());
        hasher.update(op.as_bytes());
        let id = TransactionId(bs58::encode(hasher.finalize().as_bytes()).into_string());
        if let Some(event) = event {
            debug!(tx = %id, event = event.kind(), "Ledger transition committed");
            self.events.push(event);
        }
        id
    }
}

struct Inner {
    state: RwLock<LedgerState>,
    faults: Mutex<FaultPlan>,
    max_genome_len: usize,
}

/// Ledger held entirely in process memory
#[derive(Clone)]
pub struct InMemoryLedger {
    inner: Arc<Inner>,
    signer: Identity,
}

impl InMemoryLedger {
    /// Create an empty ledger whose calls are signed by `signer`
    pub fn new(signer: Identity) -> Self {
        Self::with_max_genome_len(signer, MAX_GENOME_LEN)
    }

    /// Create an empty ledger with a custom genome length cap
    pub fn with_max_genome_len(signer: Identity, max_genome_len: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                state: RwLock::new(LedgerState::default()),
                faults: Mutex::new(FaultPlan::default()),
                max_genome_len,
            }),
            signer,
        }
    }

    /// Same ledger, signing as `signer`
    pub fn as_signer(&self, signer: Identity) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            signer,
        }
    }

    pub fn signer(&self) -> Identity {
        self.signer
    }

    /// Make the next call matching `fault` fail
    pub fn inject_fault(&self, fault: Fault) {
        self.inner.faults.lock().push(fault);
    }

    /// Faults queued but not yet triggered
    pub fn pending_faults(&self) -> usize {
        self.inner.faults.lock().len()
    }

    /// Journal of committed transitions
    pub fn events(&self) -> Vec<LedgerEvent> {
        self.inner.state.read().events.clone()
    }

    /// Funding credited to an identity
    pub fn balance(&self, identity: &Identity) -> u64 {
        self.inner
            .state
            .read()
            .balances
            .get(identity)
            .copied()
            .unwrap_or(0)
    }

    fn trip(&self, call: Fault) -> LedgerResult<()> {
        match self.inner.faults.lock().take(call) {
            Some(fault) => Err(fault.into_error()),
            None => Ok(()),
        }
    }

    fn check_genome(&self, genome: &[u8]) -> LedgerResult<()> {
        if genome.is_empty() || genome.len() > self.inner.max_genome_len {
            return Err(LedgerError::InvalidGenomeLength {
                len: genome.len(),
                max: self.inner.max_genome_len,
            });
        }
        Ok(())
    }

    fn require_authority(&self, arena: &Arena) -> LedgerResult<()> {
        if arena.authority != self.signer {
            return Err(LedgerError::Unauthorized);
        }
        Ok(())
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp()
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn get_arena(&self) -> LedgerResult<Option<Arena>> {
        Ok(self.inner.state.read().arena.clone())
    }

    async fn initialize_arena(
        &self,
        max_agents: u64,
        min_fitness_threshold: u64,
        mutation_rate_bps: u16,
    ) -> LedgerResult<TransactionId> {
        let mut state = self.inner.state.write();
        if state.arena.is_some() {
            return Err(LedgerError::ArenaAlreadyInitialized);
        }
        if max_agents < MIN_MAX_AGENTS {
            return Err(LedgerError::InvalidMaxAgents(max_agents));
        }
        if mutation_rate_bps > MAX_MUTATION_RATE_BPS {
            return Err(LedgerError::InvalidMutationRate(mutation_rate_bps));
        }

        state.arena = Some(Arena::new(
            self.signer,
            max_agents,
            min_fitness_threshold,
            mutation_rate_bps,
        ));

        let event = LedgerEvent::ArenaInitialized {
            authority: self.signer,
            max_agents,
            mutation_rate_bps,
        };
        Ok(state.commit("initialize_arena", Some(event)))
    }

    async fn register_agent(
        &self,
        genome: Vec<u8>,
        index: u64,
    ) -> LedgerResult<(TransactionId, AgentHandle)> {
        self.trip(Fault::Register)?;
        let mut state = self.inner.state.write();

        let arena = state.arena()?;
        if !arena.is_active {
            return Err(LedgerError::ArenaNotActive);
        }
        if arena.total_agents >= arena.max_agents {
            return Err(LedgerError::MaxAgentsReached {
                max: arena.max_agents,
            });
        }
        self.check_genome(&genome)?;
        if index != arena.total_agents {
            return Err(LedgerError::IndexMismatch {
                expected: arena.total_agents,
                actual: index,
            });
        }

        let handle = agent_address(&self.signer, index);
        if state.agents.contains_key(&handle) {
            return Err(LedgerError::AccountAlreadyExists(handle.to_base58()));
        }

        let generation = arena.current_generation;
        let genome_hash = content_hash(&genome);
        let total_agents = arena
            .total_agents
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let active_agents = arena
            .active_agents
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        let agent = Agent {
            handle,
            owner: self.signer,
            genome,
            fitness: 0,
            generation,
            parent: Identity::NULL,
            parent_genome_hash: GenomeDigest::ZERO,
            mutation_count: 0,
            rounds_participated: 0,
            total_fitness: 0,
            is_active: true,
            registered_at: Self::now(),
            last_round: 0,
        };

        let arena = state.arena_mut()?;
        arena.total_agents = total_agents;
        arena.active_agents = active_agents;
        state.agents.insert(handle, agent);
        state.registration_order.push(handle);

        let event = LedgerEvent::AgentRegistered {
            agent: handle,
            owner: self.signer,
            genome_hash,
            generation,
        };
        Ok((state.commit("register_agent", Some(event)), handle))
    }

    async fn submit_genome(
        &self,
        agent: AgentHandle,
        new_genome: Vec<u8>,
        lineage_parent: AgentHandle,
    ) -> LedgerResult<TransactionId> {
        self.trip(Fault::Submit(agent))?;
        let mut state = self.inner.state.write();

        let arena = state.arena()?;
        if !arena.is_active {
            return Err(LedgerError::ArenaNotActive);
        }
        let generation = arena.current_generation;

        let account = state
            .agents
            .get_mut(&agent)
            .ok_or_else(|| LedgerError::AgentNotFound(agent.to_base58()))?;
        if account.owner != self.signer {
            return Err(LedgerError::Unauthorized);
        }
        if !account.is_active {
            return Err(LedgerError::AgentNotActive);
        }
        self.check_genome(&new_genome)?;
        if new_genome.len() != account.genome.len() {
            return Err(LedgerError::InvalidGenomeLength {
                len: new_genome.len(),
                max: account.genome.len(),
            });
        }
        let mutation_count = account
            .mutation_count
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        let genome_hash = content_hash(&new_genome);
        account.parent_genome_hash = content_hash(&account.genome);
        account.parent = lineage_parent;
        account.genome = new_genome;
        account.mutation_count = mutation_count;
        account.generation = generation;

        let event = LedgerEvent::GenomeSubmitted {
            agent,
            genome_hash,
            generation,
            mutation_count,
            parent: lineage_parent,
        };
        Ok(state.commit("submit_genome", Some(event)))
    }

    async fn run_round(&self, round_number: u64) -> LedgerResult<TransactionId> {
        self.trip(Fault::RunRound)?;
        let mut state = self.inner.state.write();

        let arena = state.arena()?;
        if !arena.is_active {
            return Err(LedgerError::ArenaNotActive);
        }
        self.require_authority(arena)?;
        let expected = arena
            .current_round
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        if round_number != expected {
            return Err(LedgerError::InvalidRoundNumber {
                expected,
                actual: round_number,
            });
        }

        let generation = arena.current_generation;
        let started_at = Self::now();
        let address = arena_address();
        let seed = round_seed(&address, round_number, generation, started_at);

        state.arena_mut()?.current_round = round_number;
        state.rounds.insert(
            round_number,
            Round::open(address, round_number, generation, seed, started_at),
        );

        let event = LedgerEvent::RoundStarted {
            round_number,
            generation,
        };
        Ok(state.commit("run_round", Some(event)))
    }

    async fn score_agent(
        &self,
        agent: AgentHandle,
        round_number: u64,
    ) -> LedgerResult<TransactionId> {
        self.trip(Fault::Score(agent))?;
        let mut state = self.inner.state.write();

        self.require_authority(state.arena()?)?;

        let round = state
            .rounds
            .get(&round_number)
            .ok_or(LedgerError::RoundNotFound(round_number))?;
        if round.is_complete {
            return Err(LedgerError::RoundAlreadyComplete);
        }
        let seed = round.seed;

        let account = state
            .agents
            .get(&agent)
            .ok_or_else(|| LedgerError::AgentNotFound(agent.to_base58()))?;
        if !account.is_active {
            return Err(LedgerError::AgentNotActive);
        }
        if account.last_round >= round_number {
            return Err(LedgerError::AlreadyParticipated);
        }

        let fitness = compute_fitness(&account.genome, &seed);
        let genome_hash = content_hash(&account.genome);
        let rounds_participated = account
            .rounds_participated
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let agent_total = account
            .total_fitness
            .checked_add(fitness)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        let round = state
            .rounds
            .get_mut(&round_number)
            .ok_or(LedgerError::RoundNotFound(round_number))?;
        let participants = round
            .participants
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        let round_total = round
            .total_fitness
            .checked_add(fitness)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        round.participants = participants;
        round.total_fitness = round_total;
        round.best_fitness = round.best_fitness.max(fitness);
        round.worst_fitness = round.worst_fitness.min(fitness);

        if let Some(account) = state.agents.get_mut(&agent) {
            account.fitness = fitness;
            account.last_round = round_number;
            account.rounds_participated = rounds_participated;
            account.total_fitness = agent_total;
        }

        let event = LedgerEvent::AgentScored {
            agent,
            round_number,
            fitness,
            genome_hash,
        };
        Ok(state.commit("score_agent", Some(event)))
    }

    async fn complete_round(&self, round_number: u64) -> LedgerResult<TransactionId> {
        self.trip(Fault::CompleteRound)?;
        let mut state = self.inner.state.write();

        self.require_authority(state.arena()?)?;

        let round = state
            .rounds
            .get_mut(&round_number)
            .ok_or(LedgerError::RoundNotFound(round_number))?;
        if round.is_complete {
            return Err(LedgerError::RoundAlreadyComplete);
        }

        round.average_fitness = if round.participants > 0 {
            round.total_fitness / round.participants
        } else {
            0
        };
        if round.worst_fitness == u64::MAX {
            round.worst_fitness = 0;
        }
        round.completed_at = Self::now();
        round.is_complete = true;

        let event = LedgerEvent::RoundCompleted {
            round_number,
            generation: round.generation,
            participants: round.participants,
            best_fitness: round.best_fitness,
            average_fitness: round.average_fitness,
        };
        Ok(state.commit("complete_round", Some(event)))
    }

    async fn prune_agent(&self, agent: AgentHandle) -> LedgerResult<TransactionId> {
        self.trip(Fault::Prune(agent))?;
        let mut state = self.inner.state.write();

        let arena = state.arena()?;
        if !arena.is_active {
            return Err(LedgerError::ArenaNotActive);
        }
        self.require_authority(arena)?;
        let threshold = arena.min_fitness_threshold;

        let account = state
            .agents
            .get(&agent)
            .ok_or_else(|| LedgerError::AgentNotFound(agent.to_base58()))?;
        if !account.is_active {
            return Err(LedgerError::AgentNotActive);
        }
        if account.fitness >= threshold {
            return Err(LedgerError::AgentAboveThreshold {
                fitness: account.fitness,
                threshold,
            });
        }
        let event = LedgerEvent::AgentPruned {
            agent,
            fitness: account.fitness,
            generation: account.generation,
        };

        // Counter only moves once the account checks have passed
        let arena = state.arena_mut()?;
        arena.active_agents = arena
            .active_agents
            .checked_sub(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;
        if let Some(account) = state.agents.get_mut(&agent) {
            account.is_active = false;
        }
        Ok(state.commit("prune_agent", Some(event)))
    }

    async fn advance_generation(&self) -> LedgerResult<TransactionId> {
        self.trip(Fault::AdvanceGeneration)?;
        let mut state = self.inner.state.write();

        let arena = state.arena()?;
        if !arena.is_active {
            return Err(LedgerError::ArenaNotActive);
        }
        self.require_authority(arena)?;

        let arena = state.arena_mut()?;
        let old_generation = arena.current_generation;
        arena.current_generation = old_generation
            .checked_add(1)
            .ok_or(LedgerError::ArithmeticOverflow)?;

        let event = LedgerEvent::GenerationAdvanced {
            old_generation,
            new_generation: arena.current_generation,
            active_agents: arena.active_agents,
        };
        Ok(state.commit("advance_generation", Some(event)))
    }

    async fn get_agent(&self, handle: AgentHandle) -> LedgerResult<Option<Agent>> {
        Ok(self.inner.state.read().agents.get(&handle).cloned())
    }

    async fn get_round(&self, round_number: u64) -> LedgerResult<Option<Round>> {
        Ok(self.inner.state.read().rounds.get(&round_number).cloned())
    }

    async fn get_all_agents(&self) -> LedgerResult<Vec<Agent>> {
        let state = self.inner.state.read();
        Ok(state
            .registration_order
            .iter()
            .filter_map(|handle| state.agents.get(handle).cloned())
            .collect())
    }

    async fn request_funding(&self, amount: u64) -> LedgerResult<()> {
        self.trip(Fault::Funding)?;
        let mut state = self.inner.state.write();
        let balance = state.balances.entry(self.signer).or_insert(0);
        *balance = balance.saturating_add(amount);
        debug!(signer = %self.signer, amount, "Funding credited");
        Ok(())
    }
}
