//! Synthetic transaction history for demos
//!
//! The generator is seeded from the wallet address, so the same address
//! always yields the same history and the same report score. Nothing here is
//! real chain data; it exists so the scanner can be exercised without an API
//! key.

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::chain::{short, NftEvent, NftRef, TokenStandard, Transaction};
use crate::detect::assets::POAP_KEYWORDS;
use crate::detect::compliance::FLAGGED_ADDRESSES;
use crate::detect::registry::KNOWN_EXCHANGES;
use crate::error::Result;
use crate::report::ScanMode;
use crate::source::TransactionSource;

const BASE58_ALPHABET: &[u8] = b"123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Latest synthetic block time (2024-01-01T00:00:00Z)
const DEMO_EPOCH: i64 = 1_704_067_200;

const DOMAIN_NAMES: &[&str] = &["satoshi", "degen", "gm", "wagmi", "builder", "anon"];

/// Deterministic demo data source
#[derive(Debug, Clone, Copy, Default)]
pub struct DemoSource;

impl DemoSource {
    fn rng_for(address: &str) -> StdRng {
        // FNV-1a over the address bytes
        let seed = address.bytes().fold(0xcbf2_9ce4_8422_2325u64, |h, b| {
            (h ^ b as u64).wrapping_mul(0x0100_0000_01b3)
        });
        StdRng::seed_from_u64(seed)
    }

    fn random_address(rng: &mut StdRng) -> String {
        (0..44)
            .map(|_| BASE58_ALPHABET[rng.gen_range(0..BASE58_ALPHABET.len())] as char)
            .collect()
    }

    /// Generate `limit` transactions for `address`, newest first
    pub fn generate(address: &str, limit: u32) -> Vec<Transaction> {
        let mut rng = Self::rng_for(address);

        let peer_count = rng.gen_range(2..=12);
        let peers: Vec<String> = (0..peer_count)
            .map(|_| Self::random_address(&mut rng))
            .collect();
        let count = rng.gen_range(15..=60).min(limit as usize);

        let mut timestamp = DEMO_EPOCH;
        let mut transactions = Vec::with_capacity(count);

        for i in 0..count {
            timestamp -= rng.gen_range(60..86_400);
            let signature = format!("demo{}{:04}", short(address), i);
            let roll: u32 = rng.gen_range(0..100);

            let tx = match roll {
                // exchange deposit or withdrawal
                0..=9 => {
                    let (exchange, name) =
                        KNOWN_EXCHANGES[rng.gen_range(0..KNOWN_EXCHANGES.len())];
                    let lamports = rng.gen_range(100_000_000..20_000_000_000u64);
                    if rng.gen_bool(0.5) {
                        Transaction::new(signature, timestamp)
                            .with_description(format!(
                                "{} transferred SOL to {}",
                                name,
                                short(address)
                            ))
                            .with_native(exchange, address, lamports)
                    } else {
                        Transaction::new(signature, timestamp)
                            .with_description(format!(
                                "{} transferred SOL to {}",
                                short(address),
                                name
                            ))
                            .with_fee_payer(address)
                            .with_native(address, exchange, lamports)
                    }
                }
                // attendance badge
                10..=13 => {
                    let keyword = POAP_KEYWORDS[rng.gen_range(0..POAP_KEYWORDS.len())];
                    let mint = Self::random_address(&mut rng);
                    Transaction::new(signature, timestamp)
                        .with_description(format!("{} received a {} NFT", short(address), keyword))
                        .with_nft_event(NftEvent {
                            event_type: "NFT_MINT".to_string(),
                            buyer: address.to_string(),
                            seller: String::new(),
                            nfts: vec![NftRef {
                                mint,
                                token_standard: TokenStandard::NonFungible,
                            }],
                        })
                }
                // name-service domain
                14..=15 => {
                    let name = DOMAIN_NAMES[rng.gen_range(0..DOMAIN_NAMES.len())];
                    Transaction::new(signature, timestamp)
                        .with_description(format!(
                            "Registered {}{}.sol",
                            name,
                            rng.gen_range(0..100)
                        ))
                        .with_fee_payer(address)
                        .with_account(crate::detect::assets::NAME_SERVICE_PROGRAM_ID)
                }
                // transfer to a flagged fixture address
                16 => Transaction::new(signature, timestamp)
                    .with_description("transferred SOL")
                    .with_native(
                        address,
                        FLAGGED_ADDRESSES[rng.gen_range(0..FLAGGED_ADDRESSES.len())],
                        rng.gen_range(10_000_000..1_000_000_000u64),
                    ),
                // token transfer with a peer
                17..=34 => {
                    let peer = &peers[rng.gen_range(0..peers.len())];
                    let mint = format!("demoMint{}", rng.gen_range(0..5));
                    let amount = rng.gen_range(1.0..10_000.0f64).round();
                    let tx = Transaction::new(signature, timestamp)
                        .with_description("transferred tokens");
                    if rng.gen_bool(0.5) {
                        tx.with_token(address, peer, &mint, amount, TokenStandard::Fungible)
                    } else {
                        tx.with_token(peer, address, &mint, amount, TokenStandard::Fungible)
                    }
                }
                // SOL transfer with a peer, biased toward the first peers
                _ => {
                    let idx = rng.gen_range(0..peers.len()).min(rng.gen_range(0..peers.len()));
                    let peer = &peers[idx];
                    let lamports = rng.gen_range(1_000_000..5_000_000_000u64);
                    let tx =
                        Transaction::new(signature, timestamp).with_description("transferred SOL");
                    if rng.gen_bool(0.5) {
                        tx.with_native(address, peer, lamports)
                    } else {
                        tx.with_native(peer, address, lamports)
                    }
                }
            };

            transactions.push(tx);
        }

        transactions
    }

    /// Deterministic demo balance in SOL
    pub fn balance(address: &str) -> f64 {
        let mut rng = Self::rng_for(address);
        let lamports: u64 = rng.gen_range(0..250_000_000_000u64);
        lamports as f64 / crate::chain::LAMPORTS_PER_SOL
    }
}

#[async_trait]
impl TransactionSource for DemoSource {
    async fn fetch_transactions(&self, address: &str, limit: u32) -> Result<Vec<Transaction>> {
        Ok(Self::generate(address, limit))
    }

    async fn fetch_balance(&self, address: &str) -> Result<f64> {
        Ok(Self::balance(address))
    }

    fn mode(&self) -> ScanMode {
        ScanMode::Demo
    }
}
