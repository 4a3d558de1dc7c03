use apytypes::limb;

#[test]
fn add_n_reports_carry_out() {
    let mut dst = [0u64; 1];
    let carry = limb::add_n(&mut dst, &[u64::MAX], &[1]);
    assert_eq!(dst, [0]);
    assert_eq!(carry, 1);
}

#[test]
fn sub_n_reports_borrow() {
    let mut dst = [0u64; 1];
    let borrow = limb::sub_n(&mut dst, &[0], &[1]);
    assert_eq!(dst, [u64::MAX]);
    assert_eq!(borrow, 1);
}

#[test]
fn neg_is_its_own_inverse() {
    let mut once = [0u64; 2];
    limb::neg(&mut once, &[5, 0]);
    let mut twice = [0u64; 2];
    limb::neg(&mut twice, &once);
    assert_eq!(twice, [5, 0]);
}

#[test]
fn bit_width_matches_highest_set_bit() {
    assert_eq!(limb::bit_width(&[0b1010_0000u64]), 8);
    assert_eq!(limb::bit_width(&[0u64]), 0);
}

#[test]
fn lsl_and_lsr_round_trip_small_shifts() {
    let mut shifted = [0u64; 1];
    limb::lsl(&mut shifted, &[0b11u64], 4);
    assert_eq!(shifted, [0b11_0000]);
    let mut back = [0u64; 1];
    limb::lsr(&mut back, &shifted, 4);
    assert_eq!(back, [0b11]);
}

#[test]
fn mul_n_by_m_matches_schoolbook_product() {
    let mut dst = [0u64; 2];
    limb::mul_n_by_m(&mut dst, &[1000], &[1000]);
    assert_eq!(dst, [1_000_000, 0]);
}

#[test]
fn unsigned_div_qr_matches_expected_quotient_and_remainder() {
    let mut q = [0u64; 1];
    let mut r = [0u64; 1];
    limb::unsigned_div_qr(&mut q, &mut r, &[100], &[7]);
    assert_eq!(q, [14]);
    assert_eq!(r, [2]);
}

#[test]
fn unsigned_div_qr_runs_knuth_d_for_multi_limb_divisor() {
    // a = 10*2^64 + 3, b = 2*2^64 + 1 — divisor spans two significant
    // limbs, so this exercises Knuth's Algorithm D rather than the
    // single-limb hardware-division fast path.
    let a = [3u64, 10];
    let b = [1u64, 2];
    let mut q = [0u64; 2];
    let mut r = [0u64; 2];
    limb::unsigned_div_qr(&mut q, &mut r, &a, &b);
    assert_eq!(q, [4, 0]);
    assert_eq!(r, [u64::MAX, 1]);

    let mut prod = [0u64; 4];
    limb::mul_n_by_m(&mut prod, &q, &b);
    let mut sum = [0u64; 4];
    limb::add_n(&mut sum, &prod, &[r[0], r[1], 0, 0]);
    assert_eq!(sum, [a[0], a[1], 0, 0]);
}

#[test]
fn compare_signed_treats_top_bit_as_sign() {
    use std::cmp::Ordering;
    // -1 (all ones) vs 1
    assert_eq!(limb::compare_signed(&[u64::MAX], &[1]), Ordering::Less);
}
