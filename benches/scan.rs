#![feature(test)]

extern crate test;

use test::Bencher;

use memelite::motif_comparison::tomtom::{tomtom, TomtomOptions};
use memelite::motifs::{Motif, Pwm};
use memelite::pattern_matching::fimo::{FimoOptions, FimoScanner};
use ndarray::{array, Array2};

static TEXT: &[u8] = b"GATCACAGGTCTATCACCCTATTAACCACTCACGGGAGCTCTCCATGC\
ATTTGGTATTTTCGTCTGGGGGGTATGCACGCGATAGCATTGCGAGACGCTGGAGCCGGAGCACCCTATGTCGCAGTAT\
CTGTCTTTGATTCCTGCCTCATCCTATTATTTATCGCACCTACGTTCAATATTACAGGCGAACATACTTACTAAAGTGT\
GTTAATTAATTAATGCTTGTAGGACATAATAATAACAATTGAATGTCTGCACAGCCACTTTCCACACAGACATCATAAC\
AAAAAATTTCCACCAAACCCCCCCTCCCCCGCTTCTGGCCACAGCACTTAAACACATCTCTGCCAAACCCCAAAAACAA\
AGAACCCTAACACCAGCCTAACCAGATTTCAAATTTTATCTTTTGGCGGTATGCACTTTTAACAGTCACCCCCCAACTA\
ACACATTATTTTCCCCTCCCACTCCCATACTACTAATCTCATCAATACAACCCCCGCCCATCCTACCCAGCACACACAC\
ACCGCTGCTAACCCCATACCCCGAACCAACCAAACCCCAAAGACACCCCCCACAGTTTATGTAGCTTACCTCCTCAAAG\
CAATACACTGAAAATGTTTAGACGGGCTCACATCACCCCATAAACAAATAGGTTTGGTCCTAGCCTTTCTATTAGCTCT\
TAGTAAGATTACACATGCAAGCATCCCCGTTCCAGTGAGTTCACCCTCTAAATCACCACGATCAAAAGGAACAAGCATC";

fn gata_motif() -> Motif {
    let pwm = Pwm::new(array![
        [0.05, 0.85, 0.05, 0.85, 0.4],
        [0.05, 0.05, 0.05, 0.05, 0.2],
        [0.85, 0.05, 0.05, 0.05, 0.2],
        [0.05, 0.05, 0.85, 0.05, 0.2],
    ])
    .unwrap();
    Motif::new("GATA", pwm)
}

fn shifted_motif(shift: usize) -> Motif {
    let base = gata_motif();
    let w = base.pwm.width();
    let mut probs = Array2::from_elem((4, w), 0.25);
    for j in 0..w {
        for a in 0..4 {
            probs[[a, (j + shift) % w]] = base.pwm.probs()[[a, j]];
        }
    }
    Motif::new(format!("GATA_{}", shift), Pwm::new(probs).unwrap())
}

#[bench]
fn bench_fimo_prepare(b: &mut Bencher) {
    let motifs = vec![gata_motif()];
    b.iter(|| FimoScanner::new(&motifs, FimoOptions::default()).unwrap());
}

#[bench]
fn bench_fimo_scan(b: &mut Bencher) {
    let scanner = FimoScanner::new(
        &[gata_motif()],
        FimoOptions {
            threshold: 0.01,
            ..FimoOptions::default()
        },
    )
    .unwrap();
    b.iter(|| scanner.scan(&[TEXT]).unwrap());
}

#[bench]
fn bench_tomtom_pairwise(b: &mut Bencher) {
    let motifs: Vec<Motif> = (0..4).map(shifted_motif).collect();
    b.iter(|| tomtom(&motifs, &motifs, TomtomOptions::default()).unwrap());
}
