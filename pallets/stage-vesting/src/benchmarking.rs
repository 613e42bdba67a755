//! Benchmarking setup for pallet-stage-vesting

use super::*;
use crate::Pallet as StageVesting;
use frame_benchmarking::{account as benchmark_account, v2::*};
use frame_system::{pallet_prelude::BlockNumberFor, RawOrigin};
use sp_runtime::traits::Zero;
use sp_std::{vec, vec::Vec};

const SEED: u32 = 0;

// Install a funded operator account
fn setup_operator<T: Config>() -> T::AccountId {
	let operator: T::AccountId = benchmark_account("operator", 0, SEED);
	Operator::<T>::put(&operator);
	let balance: BalanceOf<T> = 10_000_000u32.into();
	let _ = T::Currency::deposit_creating(&operator, balance);
	operator
}

fn configure_stage<T: Config>(operator: &T::AccountId, stage: StageId, release_tge: u128) {
	let max_supply: BalanceOf<T> = 1_000_000u32.into();
	let _ = StageVesting::<T>::set_stage(
		RawOrigin::Signed(operator.clone()).into(),
		stage,
		max_supply,
		release_tge,
		6,
		24,
	);
	let locked: BalanceOf<T> = 500_000u32.into();
	let _ = StageVesting::<T>::refill_stage(RawOrigin::Signed(operator.clone()).into(), stage, locked);
}

#[benchmarks]
mod benchmarks {
	use super::*;

	#[benchmark]
	fn set_stage() {
		let operator = setup_operator::<T>();
		let max_supply: BalanceOf<T> = 1_000_000u32.into();

		#[extrinsic_call]
		set_stage(RawOrigin::Signed(operator), 0, max_supply, PERCENTAGE_100 / 20, 6, 24);

		assert_eq!(Stages::<T>::get(0).max_supply, max_supply);
	}

	#[benchmark]
	fn set_stage_batch() {
		let operator = setup_operator::<T>();
		let max_supply: BalanceOf<T> = 1_000_000u32.into();

		#[extrinsic_call]
		set_stage_batch(
			RawOrigin::Signed(operator),
			vec![0, 1, 2],
			vec![max_supply, max_supply, max_supply],
			vec![PERCENTAGE_100 / 20, PERCENTAGE_100 / 20, PERCENTAGE_100 / 2],
			vec![6, 6, 0],
			vec![24, 20, 6],
		);

		assert_eq!(Stages::<T>::get(2).period, 6);
	}

	#[benchmark]
	fn refill_stage() {
		let operator = setup_operator::<T>();
		let max_supply: BalanceOf<T> = 1_000_000u32.into();
		let _ = StageVesting::<T>::set_stage(
			RawOrigin::Signed(operator.clone()).into(),
			0,
			max_supply,
			PERCENTAGE_100 / 20,
			6,
			24,
		);
		let amount: BalanceOf<T> = 500_000u32.into();

		#[extrinsic_call]
		refill_stage(RawOrigin::Signed(operator), 0, amount);

		assert_eq!(Stages::<T>::get(0).locked_supply, amount);
	}

	#[benchmark]
	fn empty_stage() {
		let operator = setup_operator::<T>();
		configure_stage::<T>(&operator, 0, PERCENTAGE_100 / 20);

		#[extrinsic_call]
		empty_stage(RawOrigin::Signed(operator), 0);

		assert!(Stages::<T>::get(0).locked_supply.is_zero());
	}

	#[benchmark]
	fn empty_all_stages() {
		let operator = setup_operator::<T>();
		configure_stage::<T>(&operator, 0, PERCENTAGE_100 / 20);
		configure_stage::<T>(&operator, 1, PERCENTAGE_100 / 20);

		#[extrinsic_call]
		empty_all_stages(RawOrigin::Signed(operator));

		assert!(Stages::<T>::get(0).locked_supply.is_zero());
		assert!(Stages::<T>::get(1).locked_supply.is_zero());
	}

	#[benchmark]
	fn set_tge_block() {
		let operator = setup_operator::<T>();
		let block: BlockNumberFor<T> = 100u32.into();

		#[extrinsic_call]
		set_tge_block(RawOrigin::Signed(operator), block);

		assert_eq!(TgeBlock::<T>::get(), block);
	}

	#[benchmark]
	fn add_vesting() {
		let operator = setup_operator::<T>();
		configure_stage::<T>(&operator, 0, PERCENTAGE_100 / 20);
		frame_system::Pallet::<T>::set_block_number(1u32.into());
		let _ = StageVesting::<T>::set_tge_block(
			RawOrigin::Signed(operator.clone()).into(),
			100u32.into(),
		);

		let wallet: T::AccountId = benchmark_account("wallet", 0, SEED);
		let amount: BalanceOf<T> = 10_000u32.into();

		#[extrinsic_call]
		add_vesting(RawOrigin::Signed(operator), wallet.clone(), 0, amount);

		assert_eq!(VestingCounter::<T>::get(), 1);
		assert_eq!(VestingIndices::<T>::get(&wallet, 0), 1);
	}

	#[benchmark]
	fn add_vesting_batch() {
		let operator = setup_operator::<T>();
		configure_stage::<T>(&operator, 0, PERCENTAGE_100 / 20);
		frame_system::Pallet::<T>::set_block_number(1u32.into());
		let _ = StageVesting::<T>::set_tge_block(
			RawOrigin::Signed(operator.clone()).into(),
			100u32.into(),
		);

		let wallets: Vec<T::AccountId> = (0..3).map(|i| benchmark_account("wallet", i, SEED)).collect();
		let stages = vec![0, 0, 0];
		let amount: BalanceOf<T> = 10_000u32.into();
		let amounts = vec![amount, amount, amount];

		#[extrinsic_call]
		add_vesting_batch(RawOrigin::Signed(operator), wallets, stages, amounts);

		assert_eq!(VestingCounter::<T>::get(), 3);
	}

	#[benchmark]
	fn cancel_vesting() {
		let operator = setup_operator::<T>();
		configure_stage::<T>(&operator, 0, PERCENTAGE_100 / 20);
		frame_system::Pallet::<T>::set_block_number(1u32.into());
		let _ = StageVesting::<T>::set_tge_block(
			RawOrigin::Signed(operator.clone()).into(),
			100u32.into(),
		);

		let wallet: T::AccountId = benchmark_account("wallet", 0, SEED);
		let amount: BalanceOf<T> = 10_000u32.into();
		let _ = StageVesting::<T>::add_vesting(
			RawOrigin::Signed(operator.clone()).into(),
			wallet.clone(),
			0,
			amount,
		);

		#[extrinsic_call]
		cancel_vesting(RawOrigin::Signed(operator), wallet.clone(), 0);

		assert_eq!(VestingIndices::<T>::get(&wallet, 0), 0);
		assert!(Vestings::<T>::get(1).is_none());
	}

	#[benchmark]
	fn claim() {
		let operator = setup_operator::<T>();
		// Everything unlocks at the TGE block, so the claim below pays out.
		configure_stage::<T>(&operator, 0, PERCENTAGE_100);
		frame_system::Pallet::<T>::set_block_number(1u32.into());
		let _ = StageVesting::<T>::set_tge_block(
			RawOrigin::Signed(operator.clone()).into(),
			100u32.into(),
		);

		let wallet: T::AccountId = benchmark_account("wallet", 0, SEED);
		let amount: BalanceOf<T> = 10_000u32.into();
		let _ = StageVesting::<T>::add_vesting(
			RawOrigin::Signed(operator.clone()).into(),
			wallet.clone(),
			0,
			amount,
		);

		frame_system::Pallet::<T>::set_block_number(100u32.into());

		#[extrinsic_call]
		claim(RawOrigin::Signed(wallet.clone()));

		let vesting = Vestings::<T>::get(1).unwrap();
		assert_eq!(vesting.paid, amount);
	}

	#[benchmark]
	fn set_operator() {
		let operator = setup_operator::<T>();
		let new_operator: T::AccountId = benchmark_account("successor", 0, SEED);

		#[extrinsic_call]
		set_operator(RawOrigin::Signed(operator), new_operator.clone());

		assert_eq!(Operator::<T>::get(), Some(new_operator));
	}

	impl_benchmark_test_suite!(StageVesting, crate::mock::new_test_ext(), crate::mock::Test);
}
