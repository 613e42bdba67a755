use crate as pallet_stage_vesting;

use frame_support::{
	parameter_types,
	traits::{ConstU32, Everything},
	PalletId,
};
use sp_runtime::{
	testing::H256,
	traits::{BlakeTwo256, IdentityLookup},
	BuildStorage,
};

// Configure a mock runtime to test the pallet
frame_support::construct_runtime!(
	pub enum Test {
		System: frame_system,
		Balances: pallet_balances,
		StageVesting: pallet_stage_vesting,
	}
);

pub type Balance = u128;
pub type Block = frame_system::mocking::MockBlock<Test>;

/// Operator account funded at genesis.
pub const OPERATOR: u64 = 1;
/// Tokens the operator starts with; covers every refill in the fixtures.
pub const OPERATOR_SUPPLY: Balance = 600_000;

parameter_types! {
	pub const BlockHashCount: u64 = 250;
	pub const ExistentialDeposit: Balance = 1;
	pub const StageVestingPalletId: PalletId = PalletId(*b"py/stvst");
	// Short months keep schedule tests within a few hundred blocks.
	pub const BlocksPerMonth: u64 = 10;
	pub const MaxBatchLength: u32 = 30;
	pub const MaxVestingsPerWallet: u32 = 8;
}

impl frame_system::Config for Test {
	type BaseCallFilter = Everything;
	type BlockWeights = ();
	type BlockLength = ();
	type RuntimeOrigin = RuntimeOrigin;
	type RuntimeCall = RuntimeCall;
	type RuntimeTask = ();
	type Nonce = u64;
	type Hash = H256;
	type Hashing = BlakeTwo256;
	type AccountId = u64;
	type Lookup = IdentityLookup<Self::AccountId>;
	type Block = Block;
	type BlockHashCount = BlockHashCount;
	type DbWeight = ();
	type Version = ();
	type PalletInfo = PalletInfo;
	type AccountData = pallet_balances::AccountData<Balance>;
	type OnNewAccount = ();
	type OnKilledAccount = ();
	type SystemWeightInfo = ();
	type ExtensionsWeightInfo = ();
	type SS58Prefix = ();
	type OnSetCode = ();
	type MaxConsumers = frame_support::traits::ConstU32<16>;
	type SingleBlockMigrations = ();
	type MultiBlockMigrator = ();
	type PreInherents = ();
	type PostInherents = ();
	type PostTransactions = ();
	type RuntimeEvent = RuntimeEvent;
}

impl pallet_balances::Config for Test {
	type RuntimeEvent = RuntimeEvent;
	type RuntimeHoldReason = ();
	type RuntimeFreezeReason = ();
	type WeightInfo = ();
	type Balance = Balance;
	type DustRemoval = ();
	type ExistentialDeposit = ExistentialDeposit;
	type AccountStore = System;
	type ReserveIdentifier = [u8; 8];
	type FreezeIdentifier = ();
	type MaxLocks = ConstU32<50>;
	type MaxReserves = ();
	type MaxFreezes = ConstU32<0>;
	type DoneSlashHandler = ();
}

impl pallet_stage_vesting::Config for Test {
	type Currency = Balances;
	type PalletId = StageVestingPalletId;
	type BlocksPerMonth = BlocksPerMonth;
	type MaxBatchLength = MaxBatchLength;
	type MaxVestingsPerWallet = MaxVestingsPerWallet;
	type WeightInfo = ();
}

// Build genesis storage according to the mock runtime.
pub fn new_test_ext() -> sp_io::TestExternalities {
	let mut t = frame_system::GenesisConfig::<Test>::default().build_storage().unwrap();

	pallet_balances::GenesisConfig::<Test> {
		balances: vec![(OPERATOR, OPERATOR_SUPPLY)],
		dev_accounts: None,
	}
	.assimilate_storage(&mut t)
	.unwrap();

	pallet_stage_vesting::GenesisConfig::<Test> { operator: Some(OPERATOR) }
		.assimilate_storage(&mut t)
		.unwrap();

	let mut ext = sp_io::TestExternalities::new(t);
	ext.execute_with(|| System::set_block_number(1)); // Start at block 1
	ext
}

// The pallet only reads the current block number, so tests can jump directly
// to a target block.
pub fn advance_to_block(n: u64) {
	System::set_block_number(n);
}
