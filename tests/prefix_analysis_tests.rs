#[cfg(test)]
mod prefix_analysis_tests {
    use std::collections::BTreeSet;
    use std::net::Ipv4Addr;

    use aws_subnet_exporter::inventory::NetworkInterface;
    use aws_subnet_exporter::ip::{
        analyze_subnet, calculate_max_ips, enumerate_candidate_prefixes, parse_cidr,
        AnalyzerError, Cidr4,
    };
    use proptest::prelude::*;

    fn iface(ips: &[&str], prefixes: &[&str]) -> NetworkInterface {
        NetworkInterface {
            private_ips: ips.iter().map(|ip| ip.parse().unwrap()).collect(),
            delegated_prefixes: prefixes.iter().map(|p| parse_cidr(p).unwrap()).collect(),
        }
    }

    fn cidr(s: &str) -> Cidr4 {
        parse_cidr(s).unwrap()
    }

    /// One interface holding two addresses and one delegated prefix in a /24
    #[test]
    fn test_single_interface_with_delegated_prefix() {
        let interfaces = vec![iface(&["172.16.1.125", "172.16.1.126"], &["172.16.1.112/28"])];
        let occupancy = analyze_subnet("172.16.1.0/24", &interfaces).unwrap();

        assert_eq!(occupancy.total_addresses, 256);
        assert_eq!(occupancy.max_prefixes, 16);
        assert_eq!(
            occupancy.delegated_prefixes,
            BTreeSet::from([cidr("172.16.1.112/28")])
        );
        assert!(!occupancy.available_prefixes.contains(&cidr("172.16.1.112/28")));
        assert!(occupancy.available_prefixes.contains(&cidr("172.16.1.96/28")));
        assert!(occupancy.available_prefixes.contains(&cidr("172.16.1.0/28")));
        assert_eq!(occupancy.available_prefixes.len(), 15);
    }

    /// A /24 with nothing attached exposes all sixteen prefixes in order
    #[test]
    fn test_empty_subnet_lists_every_prefix() {
        let occupancy = analyze_subnet("172.16.0.0/24", &[]).unwrap();

        let expected: Vec<Cidr4> = (0..16u8)
            .map(|i| Cidr4::new(Ipv4Addr::new(172, 16, 0, i * 16), 28).unwrap())
            .collect();
        assert_eq!(occupancy.available_prefixes, expected);
        assert_eq!(occupancy.used_prefixes(), 0);
        assert_eq!(occupancy.interfaces_in_use, 0);
    }

    /// A /23 crosses the third-octet boundary without losing 10.0.1.0/28
    #[test]
    fn test_prefix_walk_crosses_octet_boundary() {
        let occupancy = analyze_subnet("10.0.0.0/23", &[]).unwrap();

        let bases: Vec<Ipv4Addr> = occupancy.available_prefixes.iter().map(|p| p.base()).collect();
        let mut expected = Vec::new();
        for third in 0..2u8 {
            for i in 0..16u8 {
                expected.push(Ipv4Addr::new(10, 0, third, i * 16));
            }
        }
        assert_eq!(bases.len(), 32);
        assert_eq!(bases, expected);
    }

    #[test]
    fn test_missing_mask_is_invalid() {
        let err = analyze_subnet("172.16.0.0", &[]).unwrap_err();
        assert!(matches!(err, AnalyzerError::InvalidCidr { .. }));
    }

    /// A /28 with one address in use has no free prefix
    #[test]
    fn test_single_prefix_subnet_with_address() {
        let occupancy = analyze_subnet("172.16.0.0/28", &[iface(&["172.16.0.5"], &[])]).unwrap();
        assert_eq!(occupancy.max_prefixes, 1);
        assert!(occupancy.available_prefixes.is_empty());
    }

    #[test]
    fn test_calculate_max_ips() {
        assert_eq!(calculate_max_ips("172.16.0.0/24").unwrap(), 254);
        assert_eq!(calculate_max_ips("172.16.0.0/16").unwrap(), 65534);
        assert_eq!(calculate_max_ips("172.16.0.0/30").unwrap(), 2);
        assert_eq!(calculate_max_ips("192.168.1.1/32").unwrap(), -1);
        assert!(calculate_max_ips("172.16.0.0").is_err());
        assert!(calculate_max_ips("999.999.999.999/24").is_err());
        assert!(calculate_max_ips("").is_err());
    }

    #[test]
    fn test_analysis_is_repeatable() {
        let interfaces = vec![
            iface(&["10.20.3.17", "10.20.0.1"], &["10.20.2.32/28", "10.20.1.0/28"]),
            iface(&["10.20.3.200"], &[]),
        ];
        let first = analyze_subnet("10.20.0.0/22", &interfaces).unwrap();
        let second = analyze_subnet("10.20.0.0/22", &interfaces).unwrap();
        assert_eq!(first, second);
        assert_eq!(format!("{:?}", first), format!("{:?}", second));
    }

    /// A subnet inside the 10.0.0.0/8 range, of mask 16..=28, with a handful
    /// of addresses and delegated prefixes drawn from inside it.
    fn subnet_with_interfaces() -> impl Strategy<Value = (Cidr4, Vec<NetworkInterface>)> {
        (16u8..=28, any::<u32>()).prop_flat_map(|(mask, raw)| {
            let subnet = Cidr4::new(Ipv4Addr::from(0x0A00_0000 | (raw & 0x00FF_FFFF)), mask).unwrap();
            let base = subnet.network_u32();
            let size = subnet.total_addresses() as u32;
            let blocks = size / 16;
            let iface = (
                prop::collection::vec(0..size, 0..8),
                prop::collection::btree_set(0..blocks, 0..4),
            )
                .prop_map(move |(offsets, prefix_blocks)| NetworkInterface {
                    private_ips: offsets.into_iter().map(|o| Ipv4Addr::from(base + o)).collect(),
                    delegated_prefixes: prefix_blocks
                        .into_iter()
                        .map(|b| Cidr4::new(Ipv4Addr::from(base + b * 16), 28).unwrap())
                        .collect(),
                });
            (Just(subnet), prop::collection::vec(iface, 0..4))
        })
    }

    proptest! {
        #[test]
        fn test_max_prefixes_matches_candidates(mask in 0u8..=28, raw in any::<u32>()) {
            let subnet = Cidr4::new(Ipv4Addr::from(raw), mask).unwrap();
            let expected = 1u64 << (28 - mask);
            prop_assert_eq!(subnet.total_addresses() / 16, expected);
            prop_assert_eq!(enumerate_candidate_prefixes(&subnet).len() as u64, expected);
        }

        #[test]
        fn test_candidates_round_trip(mask in 20u8..=28, raw in any::<u32>()) {
            let subnet = Cidr4::new(Ipv4Addr::from(raw), mask).unwrap();
            for candidate in enumerate_candidate_prefixes(&subnet) {
                let reparsed = parse_cidr(&candidate.to_string()).unwrap();
                prop_assert_eq!(reparsed, candidate);
                prop_assert!(subnet.contains_cidr(&candidate));
            }
        }

        #[test]
        fn test_occupancy_invariants((subnet, interfaces) in subnet_with_interfaces()) {
            let occupancy = analyze_subnet(&subnet.to_string(), &interfaces).unwrap();
            let candidates: BTreeSet<Cidr4> = enumerate_candidate_prefixes(&subnet).collect();

            // disjoint, and both drawn from the candidate walk
            for prefix in &occupancy.available_prefixes {
                prop_assert!(!occupancy.delegated_prefixes.contains(prefix));
                prop_assert!(candidates.contains(prefix));
            }
            prop_assert!(occupancy.delegated_prefixes.is_subset(&candidates));

            // no free prefix holds an assigned address
            for prefix in &occupancy.available_prefixes {
                for iface in &interfaces {
                    for ip in &iface.private_ips {
                        prop_assert!(!prefix.contains(*ip));
                    }
                }
            }

            // strictly ascending
            for pair in occupancy.available_prefixes.windows(2) {
                prop_assert!(pair[0].network_u32() < pair[1].network_u32());
            }

            prop_assert_eq!(
                occupancy.free_addresses,
                occupancy.total_addresses as i64 - occupancy.allocated_addresses as i64
            );

            if subnet.prefix_len() == 28 {
                prop_assert_eq!(occupancy.max_prefixes, 1);
                prop_assert!(occupancy.available_prefixes.len() <= 1);
            }

            let again = analyze_subnet(&subnet.to_string(), &interfaces).unwrap();
            prop_assert_eq!(occupancy, again);
        }
    }
}
