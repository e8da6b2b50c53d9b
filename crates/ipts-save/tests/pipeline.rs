use ipts_core::{Chain, FilterParams, FORWARD_CHAIN, Rule, Ruleset, Table, filter};
use ipts_save::{parse, scrub, to_restore_string};
use proptest::prelude::*;
use proptest::sample::subsequence;
use std::collections::BTreeSet;

fn scrub_str(input: &str, params: &FilterParams) -> String {
    let mut out = Vec::new();
    scrub(input.as_bytes(), params).unwrap().write_to(&mut out).unwrap();
    String::from_utf8(out).unwrap()
}

#[test]
fn docker_chains_and_references_are_stripped() {
    let input = "*filter\n\
                 :INPUT ACCEPT [0:0]\n\
                 :DOCKER-USER - [0:0]\n\
                 -A DOCKER-USER -j RETURN\n\
                 -A INPUT -j DOCKER-USER\n\
                 COMMIT\n";

    let params = FilterParams::new().with_exclude(["DOCKER"]);
    assert_eq!(scrub_str(input, &params), "*filter\n:INPUT ACCEPT [0:0]\nCOMMIT\n\n");
}

#[test]
fn table_selector_keeps_only_selected_block() {
    let input = "*filter\n\
                 :INPUT ACCEPT [0:0]\n\
                 -A INPUT -i lo -j ACCEPT\n\
                 COMMIT\n\
                 *nat\n\
                 :POSTROUTING ACCEPT [0:0]\n\
                 -A POSTROUTING -o eth0 -j MASQUERADE\n\
                 COMMIT\n";

    let params = FilterParams::new().with_tables(["filter"]);
    assert_eq!(
        scrub_str(input, &params),
        "*filter\n:INPUT ACCEPT [0:0]\n-A INPUT -i lo -j ACCEPT\nCOMMIT\n\n"
    );
}

#[test]
fn empty_table_round_trips() {
    assert_eq!(
        scrub_str("*filter\nCOMMIT\n", &FilterParams::new()),
        "*filter\nCOMMIT\n\n"
    );
}

#[test]
fn comment_lines_anywhere_are_ignored() {
    let plain = "*filter\n:INPUT ACCEPT [0:0]\n-A INPUT -j ACCEPT\nCOMMIT\n";
    let commented = "# header\n*filter\n# mid\n:INPUT ACCEPT [0:0]\n# before rule\n-A INPUT -j ACCEPT\nCOMMIT\n# trailer\n";

    let params = FilterParams::new();
    assert_eq!(scrub_str(commented, &params), scrub_str(plain, &params));
}

#[test]
fn lines_before_first_table_are_dropped() {
    let input = ":INPUT ACCEPT [0:0]\n-A INPUT -j DROP\n*filter\n:OUTPUT ACCEPT [0:0]\nCOMMIT\n";
    assert_eq!(
        scrub_str(input, &FilterParams::new()),
        "*filter\n:OUTPUT ACCEPT [0:0]\nCOMMIT\n\n"
    );
}

#[test]
fn container_defaults_profile_cleans_realistic_dump() {
    let input = "\
# Generated by iptables-save v1.8.9
*nat
:PREROUTING ACCEPT [0:0]
:DOCKER - [0:0]
-A PREROUTING -m addrtype --dst-type LOCAL -j DOCKER
COMMIT
*filter
:INPUT DROP [0:0]
:FORWARD DROP [0:0]
:OUTPUT ACCEPT [0:0]
:DOCKER - [0:0]
:DOCKER-ISOLATION-STAGE-1 - [0:0]
:KUBE-FIREWALL - [0:0]
:ufw-user-input - [0:0]
-A INPUT -j KUBE-FIREWALL
-A INPUT -j ufw-user-input
-A FORWARD -j DOCKER-ISOLATION-STAGE-1
-A OUTPUT -o lo -j ACCEPT
-A ufw-user-input -p tcp --dport 22 -j ACCEPT
-A KUBE-FIREWALL -m mark --mark 0x8000/0x8000 -j DROP
COMMIT
";

    let profile = ipts_core::FilterProfile::container_defaults();
    assert_eq!(
        scrub_str(input, &profile.params),
        "*filter\n\
         :INPUT DROP [0:0]\n\
         :OUTPUT ACCEPT [0:0]\n\
         :ufw-user-input - [0:0]\n\
         -A INPUT -j ufw-user-input\n\
         -A OUTPUT -o lo -j ACCEPT\n\
         -A ufw-user-input -p tcp --dport 22 -j ACCEPT\n\
         COMMIT\n\
         \n"
    );
}

#[test]
fn report_reflects_dropped_entries() {
    let input = "*filter\n:INPUT ACCEPT [0:0]\n:FORWARD DROP [0:0]\n-A FORWARD -j ACCEPT\nCOMMIT\n";
    let report = scrub(input.as_bytes(), &FilterParams::new()).unwrap().report;

    assert_eq!(report.tables.len(), 1);
    assert_eq!(report.tables[0].chains_dropped, [FORWARD_CHAIN]);
    assert_eq!(report.rules_dropped(), 1);
}

const TABLES: &[&str] = &["filter", "nat", "mangle", "raw"];
const CHAINS: &[&str] = &[
    "INPUT",
    "FORWARD",
    "OUTPUT",
    "PREROUTING",
    "DOCKER",
    "DOCKER-USER",
    "KUBE-SERVICES",
    "custom",
];
const TARGETS: &[&str] = &["ACCEPT", "DROP", "RETURN", "DOCKER", "KUBE-MARK-DROP", "custom"];
const PATTERNS: &[&str] = &["DOCKER", "KUBE", "cust", "ACC"];

fn arb_table() -> impl Strategy<Value = Table> {
    (
        prop::sample::select(TABLES),
        prop::collection::vec(prop::sample::select(CHAINS), 0..6),
        prop::collection::vec(
            (prop::sample::select(CHAINS), prop::sample::select(TARGETS), 0u16..1024),
            0..10,
        ),
    )
        .prop_map(|(name, chains, rules)| {
            let mut table = Table::new(name);
            let mut seen = BTreeSet::new();
            for chain in chains {
                if seen.insert(chain) {
                    let policy = if chain == "custom" || chain.contains('-') { "-" } else { "ACCEPT" };
                    table.chains.push(Chain::new(chain, policy, "[0:0]"));
                }
            }
            for (chain, target, port) in rules {
                let raw = format!("-A {} -p tcp --dport {} -j {}", chain, port, target);
                table.rules.push(Rule::new(chain, &raw));
            }
            table
        })
}

fn arb_ruleset() -> impl Strategy<Value = Ruleset> {
    prop::collection::vec(arb_table(), 0..4).prop_map(|tables| tables.into_iter().collect())
}

fn arb_params() -> impl Strategy<Value = FilterParams> {
    (
        subsequence(TABLES, 0..=2),
        subsequence(CHAINS, 0..=3),
        subsequence(PATTERNS, 0..=2),
    )
        .prop_map(|(tables, chains, exclude)| {
            FilterParams::new()
                .with_tables(tables)
                .with_chains(chains)
                .with_exclude(exclude)
        })
}

fn retained(ruleset: &Ruleset) -> usize {
    ruleset.chain_count() + ruleset.rule_count()
}

proptest! {
    #[test]
    fn serialize_then_parse_is_identity(ruleset in arb_ruleset()) {
        let text = to_restore_string(&ruleset);
        let reparsed = parse(text.as_bytes()).unwrap();

        prop_assert_eq!(&reparsed, &ruleset);
        prop_assert_eq!(to_restore_string(&reparsed), text);
    }

    #[test]
    fn filtering_is_idempotent(ruleset in arb_ruleset(), params in arb_params()) {
        let once = filter(&ruleset, &params);
        let twice = filter(&once, &params);
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn forward_never_survives(ruleset in arb_ruleset(), params in arb_params()) {
        let out = filter(&ruleset, &params);
        for table in &out {
            prop_assert!(table.chains.iter().all(|c| c.name != FORWARD_CHAIN));
            prop_assert!(table.rules.iter().all(|r| r.chain != FORWARD_CHAIN));
        }
    }

    #[test]
    fn larger_selectors_never_retain_less(
        ruleset in arb_ruleset(),
        chains in subsequence(CHAINS, 1..=3),
        extra_chains in subsequence(CHAINS, 0..=3),
        tables in subsequence(TABLES, 1..=2),
        extra_tables in subsequence(TABLES, 0..=2),
        exclude in subsequence(PATTERNS, 0..=2),
    ) {
        let narrow = FilterParams::new()
            .with_tables(tables.clone())
            .with_chains(chains.clone())
            .with_exclude(exclude.clone());
        let wide = FilterParams::new()
            .with_tables(tables.into_iter().chain(extra_tables))
            .with_chains(chains.into_iter().chain(extra_chains))
            .with_exclude(exclude);

        prop_assert!(retained(&filter(&ruleset, &narrow)) <= retained(&filter(&ruleset, &wide)));
    }

    #[test]
    fn rules_mentioning_a_pattern_are_removed(ruleset in arb_ruleset(), params in arb_params()) {
        let out = filter(&ruleset, &params);
        for table in &out {
            for rule in &table.rules {
                prop_assert!(params.exclude.iter().all(|p| !rule.raw.contains(p.as_str())));
            }
        }
    }
}
