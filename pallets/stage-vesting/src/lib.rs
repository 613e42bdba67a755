//! # Stage Vesting Pallet
//!
//! Capped sale-stage accounting with TGE-anchored vesting schedules.
//!
//! Investors receive vestings inside fixed sale stages (e.g. SEED, PRIVATE,
//! PUBLIC). Each stage has a hard supply cap, a refilled (locked) supply, an
//! initial release fraction paid out at the TGE block, a cliff and a linear
//! vesting period, both expressed in months. A single operator account manages
//! stages and vestings; wallets claim their unlocked tokens themselves.
//!
//! ## Interface
//!
//! ### Dispatchable Functions
//!
//! * `set_stage` / `set_stage_batch` - configure stage caps and schedules
//! * `refill_stage` - lock tokens into a stage, up to its max supply
//! * `empty_stage` / `empty_all_stages` - return unallocated tokens to the operator
//! * `set_tge_block` - schedule the token generation event
//! * `add_vesting` / `add_vesting_batch` - allocate vestings before the TGE
//! * `cancel_vesting` - remove a vesting, forgiving its unpaid remainder
//! * `claim` - pay out everything currently claimable to the calling wallet
//! * `set_operator` - hand over operator rights

#![cfg_attr(not(feature = "std"), no_std)]

pub use pallet::*;

#[cfg(test)]
mod mock;


#[cfg(feature = "runtime-benchmarks")]
mod benchmarking;
pub mod weights;
pub use weights::*;

use frame_support::traits::Currency;

type BalanceOf<T> =
	<<T as Config>::Currency as Currency<<T as frame_system::Config>::AccountId>>::Balance;

#[frame_support::pallet]
pub mod pallet {
	use super::*;
	use frame_support::{
		pallet_prelude::*,
		traits::{Currency, ExistenceRequirement, Get},
		PalletId,
	};
	use frame_system::pallet_prelude::*;
	use sp_runtime::{
		helpers_128bit::multiply_by_rational_with_rounding,
		traits::{AccountIdConversion, CheckedAdd, Saturating, Zero},
		ArithmeticError, Rounding,
	};
	use sp_std::prelude::*;

	/// Fixed-point scale for the TGE release fraction. 10^27 == 100%.
	pub const PERCENTAGE_100: u128 = 1_000_000_000_000_000_000_000_000_000;

	/// Identifier of a sale stage.
	pub type StageId = u32;

	/// Identifier of a vesting. Zero means "no vesting".
	pub type VestingId = u64;

	#[derive(
		Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen, Default,
	)]
	pub struct StageInfo<Balance> {
		pub max_supply: Balance,     // Hard cap on tokens ever locked into the stage
		pub locked_supply: Balance,  // Tokens refilled and not yet emptied
		pub vested_supply: Balance,  // Tokens promised to live vestings (plus paid-out parts)
		pub claimed_supply: Balance, // Tokens already paid out to wallets
		pub release_tge: u128,       // Fraction unlocked at TGE, PERCENTAGE_100 scale
		pub cliff: u32,              // Months after TGE before linear release starts
		pub period: u32,             // Months of linear release after the cliff
	}

	#[derive(Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen)]
	pub struct VestingInfo<AccountId, Balance> {
		pub wallet: AccountId,
		pub stage: StageId,
		pub amount: Balance,
		pub paid: Balance,
	}

	/// Aggregated stage accounting returned by [`Pallet::get_stage_info`].
	#[derive(
		Encode, Decode, Clone, PartialEq, Eq, RuntimeDebug, TypeInfo, MaxEncodedLen, Default,
	)]
	pub struct StageOverview<Balance> {
		pub max_supply: Balance,
		pub locked_supply: Balance,
		pub vested_supply: Balance,
		pub claimed_supply: Balance,
		pub current_supply: Balance,     // locked_supply - claimed_supply
		pub unallocated_supply: Balance, // locked_supply - vested_supply
	}

	/// Stage records, keyed by stage id. Unset stages read as zeroed records.
	#[pallet::storage]
	pub type Stages<T: Config> =
		StorageMap<_, Blake2_128Concat, StageId, StageInfo<BalanceOf<T>>, ValueQuery>;

	/// Vesting records, keyed by vesting id. Ids start at 1 and are never reused.
	#[pallet::storage]
	pub type Vestings<T: Config> = StorageMap<
		_,
		Blake2_128Concat,
		VestingId,
		VestingInfo<T::AccountId, BalanceOf<T>>,
		OptionQuery,
	>;

	/// (wallet, stage) -> vesting id; zero when the pair has no live vesting.
	#[pallet::storage]
	pub type VestingIndices<T: Config> = StorageDoubleMap<
		_,
		Blake2_128Concat,
		T::AccountId,
		Blake2_128Concat,
		StageId,
		VestingId,
		ValueQuery,
	>;

	/// Vesting ids owned by a wallet. Order is not meaningful.
	#[pallet::storage]
	pub type OwnedVestings<T: Config> = StorageMap<
		_,
		Blake2_128Concat,
		T::AccountId,
		BoundedVec<VestingId, T::MaxVestingsPerWallet>,
		ValueQuery,
	>;

	/// Last assigned vesting id.
	#[pallet::storage]
	pub type VestingCounter<T: Config> = StorageValue<_, VestingId, ValueQuery>;

	/// Block of the token generation event. Zero means "not scheduled yet";
	/// all unlock schedules are measured from this block.
	#[pallet::storage]
	pub type TgeBlock<T: Config> = StorageValue<_, BlockNumberFor<T>, ValueQuery>;

	/// Account allowed to manage stages and vestings.
	#[pallet::storage]
	pub type Operator<T: Config> = StorageValue<_, T::AccountId, OptionQuery>;

	#[pallet::config]
	pub trait Config: frame_system::Config<RuntimeEvent: From<Event<Self>>> {
		/// The currency in which vestings are denominated.
		type Currency: Currency<Self::AccountId>;

		/// The pallet id, used for deriving the account holding refilled supply.
		#[pallet::constant]
		type PalletId: Get<PalletId>;

		/// Number of blocks in one month; stage cliffs and periods are
		/// expressed in months.
		#[pallet::constant]
		type BlocksPerMonth: Get<BlockNumberFor<Self>>;

		/// Maximum number of entries accepted by `add_vesting_batch`.
		#[pallet::constant]
		type MaxBatchLength: Get<u32>;

		/// Maximum number of vestings a single wallet can hold.
		#[pallet::constant]
		type MaxVestingsPerWallet: Get<u32>;

		type WeightInfo: WeightInfo;
	}

	#[pallet::genesis_config]
	pub struct GenesisConfig<T: Config> {
		pub operator: Option<T::AccountId>,
	}

	impl<T: Config> Default for GenesisConfig<T> {
		fn default() -> Self {
			Self { operator: None }
		}
	}

	#[pallet::genesis_build]
	impl<T: Config> BuildGenesisConfig for GenesisConfig<T> {
		fn build(&self) {
			if let Some(operator) = &self.operator {
				Operator::<T>::put(operator);
			}
		}
	}

	#[pallet::event]
	#[pallet::generate_deposit(pub(super) fn deposit_event)]
	pub enum Event<T: Config> {
		/// Stage schedule fields were written [stage, max_supply, release_tge, cliff, period]
		StageSet {
			stage: StageId,
			max_supply: BalanceOf<T>,
			release_tge: u128,
			cliff: u32,
			period: u32,
		},
		/// Tokens were locked into a stage [stage, amount]
		StageRefilled { stage: StageId, amount: BalanceOf<T> },
		/// Unallocated tokens were returned to the operator [stage, amount]
		StageEmptied { stage: StageId, amount: BalanceOf<T> },
		/// The TGE block was scheduled [block]
		TgeBlockSet { block: BlockNumberFor<T> },
		/// Operator rights were handed over [operator]
		OperatorSet { operator: T::AccountId },
		/// A vesting was created [wallet, stage, amount, vesting_id]
		VestingAdded {
			wallet: T::AccountId,
			stage: StageId,
			amount: BalanceOf<T>,
			vesting_id: VestingId,
		},
		/// A vesting was cancelled; its unpaid remainder returned to the stage
		/// [wallet, stage, vesting_id]
		VestingCancelled { wallet: T::AccountId, stage: StageId, vesting_id: VestingId },
		/// Tokens were claimed from a vesting [wallet, stage, amount, vesting_id]
		TokensClaimed {
			wallet: T::AccountId,
			stage: StageId,
			amount: BalanceOf<T>,
			vesting_id: VestingId,
		},
	}

	#[pallet::error]
	pub enum Error<T> {
		NotOperator,              // Caller is not the configured operator
		LengthMismatch,           // Batch arrays differ in length
		TooManyArguments,         // Batch exceeds MaxBatchLength
		MaxSupplyExceeded,        // Refill would exceed the stage max supply
		InsufficientLockedSupply, // Vesting would exceed the refilled supply
		TgePassed,                // Vestings can only be added before the TGE block
		AlreadyInvested,          // The wallet already has a vesting in this stage
		VestingNotFound,          // No vesting for the given wallet and stage
		TooManyVestings,          // Wallet holds too many vestings already
	}

	#[pallet::pallet]
	pub struct Pallet<T>(_);

	#[pallet::call]
	impl<T: Config> Pallet<T> {
		/// Configure a stage.
		///
		/// Writes only the schedule fields; the accounting counters of the
		/// stage (locked, vested and claimed supply) persist across
		/// reconfiguration.
		#[pallet::call_index(0)]
		#[pallet::weight(T::WeightInfo::set_stage())]
		pub fn set_stage(
			origin: OriginFor<T>,
			stage: StageId,
			max_supply: BalanceOf<T>,
			release_tge: u128,
			cliff: u32,
			period: u32,
		) -> DispatchResult {
			Self::ensure_operator(origin)?;
			Self::do_set_stage(stage, max_supply, release_tge, cliff, period);
			Ok(())
		}

		/// Configure several stages at once.
		///
		/// Fails with `LengthMismatch` if the parallel arrays differ in
		/// length; otherwise behaves like `set_stage` per element.
		#[pallet::call_index(1)]
		#[pallet::weight(T::WeightInfo::set_stage_batch())]
		pub fn set_stage_batch(
			origin: OriginFor<T>,
			stages: Vec<StageId>,
			max_supplies: Vec<BalanceOf<T>>,
			releases_tge: Vec<u128>,
			cliffs: Vec<u32>,
			periods: Vec<u32>,
		) -> DispatchResult {
			Self::ensure_operator(origin)?;

			ensure!(
				stages.len() == max_supplies.len()
					&& stages.len() == releases_tge.len()
					&& stages.len() == cliffs.len()
					&& stages.len() == periods.len(),
				Error::<T>::LengthMismatch
			);

			for (i, stage) in stages.into_iter().enumerate() {
				Self::do_set_stage(stage, max_supplies[i], releases_tge[i], cliffs[i], periods[i]);
			}
			Ok(())
		}

		/// Lock `amount` tokens into a stage.
		///
		/// Transfers the tokens from the operator to the pallet account.
		/// Fails with `MaxSupplyExceeded` if the refill would push the locked
		/// supply above the stage's max supply.
		#[pallet::call_index(2)]
		#[pallet::weight(T::WeightInfo::refill_stage())]
		pub fn refill_stage(
			origin: OriginFor<T>,
			stage: StageId,
			amount: BalanceOf<T>,
		) -> DispatchResult {
			let operator = Self::ensure_operator(origin)?;

			let mut info = Stages::<T>::get(stage);
			let new_locked =
				info.locked_supply.checked_add(&amount).ok_or(ArithmeticError::Overflow)?;
			ensure!(new_locked <= info.max_supply, Error::<T>::MaxSupplyExceeded);

			T::Currency::transfer(
				&operator,
				&Self::account_id(),
				amount,
				ExistenceRequirement::KeepAlive,
			)?;

			info.locked_supply = new_locked;
			Stages::<T>::insert(stage, info);

			Self::deposit_event(Event::StageRefilled { stage, amount });
			Ok(())
		}

		/// Return the unallocated supply of a stage to the operator.
		///
		/// A stage without unallocated supply is left untouched; this is not
		/// an error.
		#[pallet::call_index(3)]
		#[pallet::weight(T::WeightInfo::empty_stage())]
		pub fn empty_stage(origin: OriginFor<T>, stage: StageId) -> DispatchResult {
			let operator = Self::ensure_operator(origin)?;
			Self::do_empty_stage(stage, &operator)
		}

		/// Return the unallocated supply of every configured stage to the
		/// operator.
		#[pallet::call_index(4)]
		#[pallet::weight(T::WeightInfo::empty_all_stages())]
		pub fn empty_all_stages(origin: OriginFor<T>) -> DispatchResult {
			let operator = Self::ensure_operator(origin)?;

			let stage_ids: Vec<StageId> = Stages::<T>::iter_keys().collect();
			for stage in stage_ids {
				Self::do_empty_stage(stage, &operator)?;
			}
			Ok(())
		}

		/// Schedule the token generation event.
		#[pallet::call_index(5)]
		#[pallet::weight(T::WeightInfo::set_tge_block())]
		pub fn set_tge_block(origin: OriginFor<T>, block: BlockNumberFor<T>) -> DispatchResult {
			Self::ensure_operator(origin)?;
			TgeBlock::<T>::put(block);
			Self::deposit_event(Event::TgeBlockSet { block });
			Ok(())
		}

		/// Create a vesting of `amount` for `wallet` in `stage`.
		///
		/// Only possible strictly before the TGE block. A wallet can hold at
		/// most one live vesting per stage, and the stage must have enough
		/// locked supply left to cover the amount.
		#[pallet::call_index(6)]
		#[pallet::weight(T::WeightInfo::add_vesting())]
		pub fn add_vesting(
			origin: OriginFor<T>,
			wallet: T::AccountId,
			stage: StageId,
			amount: BalanceOf<T>,
		) -> DispatchResult {
			Self::ensure_operator(origin)?;
			ensure!(
				frame_system::Pallet::<T>::block_number() < TgeBlock::<T>::get(),
				Error::<T>::TgePassed
			);
			Self::do_add_vesting(&wallet, stage, amount)
		}

		/// Create several vestings at once, all-or-nothing.
		///
		/// Fails with `TooManyArguments` above `MaxBatchLength` entries and
		/// with `LengthMismatch` if the parallel arrays differ in length. Any
		/// failing element rejects the whole batch.
		#[pallet::call_index(7)]
		#[pallet::weight(T::WeightInfo::add_vesting_batch())]
		pub fn add_vesting_batch(
			origin: OriginFor<T>,
			wallets: Vec<T::AccountId>,
			stages: Vec<StageId>,
			amounts: Vec<BalanceOf<T>>,
		) -> DispatchResult {
			Self::ensure_operator(origin)?;
			ensure!(
				frame_system::Pallet::<T>::block_number() < TgeBlock::<T>::get(),
				Error::<T>::TgePassed
			);
			ensure!(
				wallets.len() <= T::MaxBatchLength::get() as usize,
				Error::<T>::TooManyArguments
			);
			ensure!(
				wallets.len() == stages.len() && wallets.len() == amounts.len(),
				Error::<T>::LengthMismatch
			);

			for ((wallet, stage), amount) in
				wallets.into_iter().zip(stages.into_iter()).zip(amounts.into_iter())
			{
				Self::do_add_vesting(&wallet, stage, amount)?;
			}
			Ok(())
		}

		/// Cancel the vesting of `wallet` in `stage`.
		///
		/// The unpaid remainder returns to the stage's unallocated supply;
		/// tokens already paid out stay with the wallet and remain counted in
		/// the stage's vested and claimed supplies.
		#[pallet::call_index(8)]
		#[pallet::weight(T::WeightInfo::cancel_vesting())]
		pub fn cancel_vesting(
			origin: OriginFor<T>,
			wallet: T::AccountId,
			stage: StageId,
		) -> DispatchResult {
			Self::ensure_operator(origin)?;

			let vesting_id = VestingIndices::<T>::get(&wallet, stage);
			ensure!(vesting_id != 0, Error::<T>::VestingNotFound);
			let vesting = Vestings::<T>::take(vesting_id).ok_or(Error::<T>::VestingNotFound)?;

			let remainder = vesting.amount.saturating_sub(vesting.paid);
			Stages::<T>::mutate(stage, |info| {
				info.vested_supply = info.vested_supply.saturating_sub(remainder);
			});

			VestingIndices::<T>::remove(&wallet, stage);
			OwnedVestings::<T>::mutate(&wallet, |ids| {
				if let Some(pos) = ids.iter().position(|id| *id == vesting_id) {
					ids.swap_remove(pos);
				}
			});

			Self::deposit_event(Event::VestingCancelled { wallet, stage, vesting_id });
			Ok(())
		}

		/// Pay out everything currently claimable to the calling wallet.
		///
		/// Walks all vestings owned by the caller; a wallet with nothing
		/// unlocked (or no vestings at all) succeeds without effect, so
		/// claiming twice in the same block pays nothing the second time.
		#[pallet::call_index(9)]
		#[pallet::weight(T::WeightInfo::claim())]
		pub fn claim(origin: OriginFor<T>) -> DispatchResult {
			let who = ensure_signed(origin)?;

			// Read the clock once so every vesting is evaluated against the
			// same block.
			let now = frame_system::Pallet::<T>::block_number();
			let tge = TgeBlock::<T>::get();

			let owned = OwnedVestings::<T>::get(&who);
			let mut total: BalanceOf<T> = Zero::zero();

			for vesting_id in owned {
				let mut vesting =
					Vestings::<T>::get(vesting_id).ok_or(Error::<T>::VestingNotFound)?;
				let stage = Stages::<T>::get(vesting.stage);

				let unlocked = Self::unlocked_amount(&stage, &vesting, now, tge)?;
				let claimable = unlocked.saturating_sub(vesting.paid);
				if claimable.is_zero() {
					continue;
				}

				vesting.paid = vesting.paid.saturating_add(claimable);
				let stage_id = vesting.stage;
				Vestings::<T>::insert(vesting_id, &vesting);
				Stages::<T>::mutate(stage_id, |info| {
					info.claimed_supply = info.claimed_supply.saturating_add(claimable);
				});

				total = total.saturating_add(claimable);
				Self::deposit_event(Event::TokensClaimed {
					wallet: who.clone(),
					stage: stage_id,
					amount: claimable,
					vesting_id,
				});
			}

			if !total.is_zero() {
				log::debug!(
					target: "runtime::stage-vesting",
					"paying out {:?} to {:?}",
					total,
					who,
				);
				T::Currency::transfer(
					&Self::account_id(),
					&who,
					total,
					ExistenceRequirement::AllowDeath,
				)?;
			}
			Ok(())
		}

		/// Hand operator rights to `new_operator`. Root or current operator.
		#[pallet::call_index(10)]
		#[pallet::weight(T::WeightInfo::set_operator())]
		pub fn set_operator(origin: OriginFor<T>, new_operator: T::AccountId) -> DispatchResult {
			if ensure_root(origin.clone()).is_err() {
				Self::ensure_operator(origin)?;
			}
			Operator::<T>::put(&new_operator);
			Self::deposit_event(Event::OperatorSet { operator: new_operator });
			Ok(())
		}
	}

	impl<T: Config> Pallet<T> {
		/// Account holding the refilled supply of every stage.
		pub fn account_id() -> T::AccountId {
			T::PalletId::get().into_account_truncating()
		}

		/// The configured operator, if any.
		pub fn operator() -> Option<T::AccountId> {
			Operator::<T>::get()
		}

		/// Block of the token generation event. Zero means "not scheduled".
		pub fn tge_block() -> BlockNumberFor<T> {
			TgeBlock::<T>::get()
		}

		/// Raw counters of a stage plus the derived current and unallocated
		/// supplies.
		pub fn get_stage_info(stage: StageId) -> StageOverview<BalanceOf<T>> {
			let info = Stages::<T>::get(stage);
			StageOverview {
				max_supply: info.max_supply,
				locked_supply: info.locked_supply,
				vested_supply: info.vested_supply,
				claimed_supply: info.claimed_supply,
				current_supply: info.locked_supply.saturating_sub(info.claimed_supply),
				unallocated_supply: info.locked_supply.saturating_sub(info.vested_supply),
			}
		}

		/// Vesting id of `wallet` in `stage`; zero when there is none.
		pub fn get_vesting_index(wallet: &T::AccountId, stage: StageId) -> VestingId {
			VestingIndices::<T>::get(wallet, stage)
		}

		/// Number of vestings currently owned by `wallet`.
		pub fn count_owned_vestings(wallet: &T::AccountId) -> u32 {
			OwnedVestings::<T>::get(wallet).len() as u32
		}

		/// The vesting record behind `vesting_id`, if it exists.
		pub fn get_vesting_info(
			vesting_id: VestingId,
		) -> Option<VestingInfo<T::AccountId, BalanceOf<T>>> {
			Vestings::<T>::get(vesting_id)
		}

		/// Amount `wallet` could claim from `stage` at the current block.
		pub fn claimable_balance(
			wallet: &T::AccountId,
			stage: StageId,
		) -> Result<BalanceOf<T>, DispatchError> {
			let vesting_id = VestingIndices::<T>::get(wallet, stage);
			if vesting_id == 0 {
				return Ok(Zero::zero());
			}
			let vesting = Vestings::<T>::get(vesting_id).ok_or(Error::<T>::VestingNotFound)?;
			let info = Stages::<T>::get(stage);
			let now = frame_system::Pallet::<T>::block_number();
			let tge = TgeBlock::<T>::get();
			let unlocked = Self::unlocked_amount(&info, &vesting, now, tge)?;
			Ok(unlocked.saturating_sub(vesting.paid))
		}

		fn ensure_operator(origin: OriginFor<T>) -> Result<T::AccountId, DispatchError> {
			let who = ensure_signed(origin)?;
			ensure!(Operator::<T>::get().as_ref() == Some(&who), Error::<T>::NotOperator);
			Ok(who)
		}

		fn do_set_stage(
			stage: StageId,
			max_supply: BalanceOf<T>,
			release_tge: u128,
			cliff: u32,
			period: u32,
		) {
			Stages::<T>::mutate(stage, |info| {
				info.max_supply = max_supply;
				info.release_tge = release_tge;
				info.cliff = cliff;
				info.period = period;
			});
			Self::deposit_event(Event::StageSet { stage, max_supply, release_tge, cliff, period });
		}

		fn do_empty_stage(stage: StageId, operator: &T::AccountId) -> DispatchResult {
			let mut info = Stages::<T>::get(stage);
			let excess = info.locked_supply.saturating_sub(info.vested_supply);
			if excess.is_zero() {
				return Ok(());
			}

			T::Currency::transfer(
				&Self::account_id(),
				operator,
				excess,
				ExistenceRequirement::AllowDeath,
			)?;

			info.locked_supply = info.vested_supply;
			Stages::<T>::insert(stage, info);

			Self::deposit_event(Event::StageEmptied { stage, amount: excess });
			Ok(())
		}

		fn do_add_vesting(
			wallet: &T::AccountId,
			stage: StageId,
			amount: BalanceOf<T>,
		) -> DispatchResult {
			ensure!(VestingIndices::<T>::get(wallet, stage) == 0, Error::<T>::AlreadyInvested);

			let mut info = Stages::<T>::get(stage);
			let new_vested =
				info.vested_supply.checked_add(&amount).ok_or(ArithmeticError::Overflow)?;
			ensure!(new_vested <= info.locked_supply, Error::<T>::InsufficientLockedSupply);
			info.vested_supply = new_vested;
			Stages::<T>::insert(stage, info);

			let vesting_id = VestingCounter::<T>::get().wrapping_add(1);
			VestingCounter::<T>::put(vesting_id);

			Vestings::<T>::insert(
				vesting_id,
				VestingInfo { wallet: wallet.clone(), stage, amount, paid: Zero::zero() },
			);
			VestingIndices::<T>::insert(wallet, stage, vesting_id);
			OwnedVestings::<T>::try_mutate(wallet, |ids| {
				ids.try_push(vesting_id).map_err(|_| Error::<T>::TooManyVestings)
			})?;

			Self::deposit_event(Event::VestingAdded {
				wallet: wallet.clone(),
				stage,
				amount,
				vesting_id,
			});
			Ok(())
		}

		// Unlock curve: nothing before the TGE block, an upfront cut at TGE,
		// flat until the cliff ends, linear over the period, clamped at the
		// full amount afterwards. Divisions truncate.
		fn unlocked_amount(
			stage: &StageInfo<BalanceOf<T>>,
			vesting: &VestingInfo<T::AccountId, BalanceOf<T>>,
			now: BlockNumberFor<T>,
			tge: BlockNumberFor<T>,
		) -> Result<BalanceOf<T>, DispatchError> {
			if tge.is_zero() || now < tge {
				return Ok(Zero::zero());
			}

			let amount: u128 = vesting
				.amount
				.try_into()
				.map_err(|_| DispatchError::Other("Balance conversion failed"))?;
			let now_u: u128 = now
				.try_into()
				.map_err(|_| DispatchError::Other("Block number conversion failed"))?;
			let tge_u: u128 = tge
				.try_into()
				.map_err(|_| DispatchError::Other("Block number conversion failed"))?;
			let blocks_per_month: u128 = T::BlocksPerMonth::get()
				.try_into()
				.map_err(|_| DispatchError::Other("Block number conversion failed"))?;

			let upfront = multiply_by_rational_with_rounding(
				amount,
				stage.release_tge,
				PERCENTAGE_100,
				Rounding::Down,
			)
			.ok_or(ArithmeticError::Overflow)?;

			let cliff_blocks = (stage.cliff as u128)
				.checked_mul(blocks_per_month)
				.ok_or(ArithmeticError::Overflow)?;
			let cliff_end = tge_u.checked_add(cliff_blocks).ok_or(ArithmeticError::Overflow)?;
			if now_u < cliff_end {
				return Self::balance_from(upfront);
			}

			let period_blocks = (stage.period as u128)
				.checked_mul(blocks_per_month)
				.ok_or(ArithmeticError::Overflow)?;
			let vesting_end =
				cliff_end.checked_add(period_blocks).ok_or(ArithmeticError::Overflow)?;
			if now_u >= vesting_end {
				return Ok(vesting.amount);
			}

			let remainder = amount.checked_sub(upfront).ok_or(ArithmeticError::Underflow)?;
			let elapsed = now_u - cliff_end;
			let linear =
				multiply_by_rational_with_rounding(remainder, elapsed, period_blocks, Rounding::Down)
					.ok_or(ArithmeticError::Overflow)?;

			Self::balance_from(upfront.checked_add(linear).ok_or(ArithmeticError::Overflow)?)
		}

		fn balance_from(value: u128) -> Result<BalanceOf<T>, DispatchError> {
			BalanceOf::<T>::try_from(value)
				.map_err(|_| DispatchError::Other("Balance conversion failed"))
		}
	}
}
