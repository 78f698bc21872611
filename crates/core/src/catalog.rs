//! Static pools the generator draws student profile fields from.

use rand::seq::SliceRandom;
use rand::Rng;

pub const FIRST_NAMES: &[&str] = &[
    "Aarav", "Aditi", "Akash", "Ananya", "Arjun", "Asha", "Bhavna", "Chetan", "Deepak", "Divya",
    "Farhan", "Gauri", "Harsh", "Isha", "Jaya", "Karan", "Kavya", "Lakshmi", "Manoj", "Meera",
    "Nikhil", "Neha", "Omkar", "Pooja", "Pranav", "Priya", "Rahul", "Riya", "Sanjay", "Shreya",
    "Tanvi", "Tarun", "Uma", "Varun", "Vidya", "Yash", "Zoya",
];

pub const LAST_NAMES: &[&str] = &[
    "Agarwal", "Bhat", "Chopra", "Das", "Desai", "Gill", "Iyer", "Joshi", "Kapoor", "Kumar",
    "Mehta", "Menon", "Mishra", "Nair", "Pandey", "Patel", "Pillai", "Rao", "Reddy", "Sharma",
    "Singh", "Sinha", "Thakur", "Varma", "Yadav",
];

pub const CITIES: &[&str] = &[
    "Ahmedabad", "Bengaluru", "Bhopal", "Chennai", "Coimbatore", "Delhi", "Hyderabad", "Indore",
    "Jaipur", "Kochi", "Kolkata", "Lucknow", "Madurai", "Mumbai", "Mysuru", "Nagpur", "Patna",
    "Pune", "Surat", "Thiruvananthapuram", "Vadodara", "Visakhapatnam",
];

pub const COMPANIES: &[&str] = &[
    "Infosys", "Wipro", "Tata Consultancy Services", "HCL Technologies", "Tech Mahindra",
    "Zoho", "Freshworks", "Mu Sigma", "Fractal Analytics", "LatentView Analytics",
    "Accenture", "Cognizant", "Capgemini", "Mindtree", "Razorpay", "Swiggy", "Zomato",
];

pub const EMAIL_DOMAINS: &[&str] = &["gmail.com", "yahoo.co.in", "outlook.com", "example.org"];

pub(crate) fn pick<'a, R: Rng + ?Sized>(rng: &mut R, pool: &'a [&'a str]) -> &'a str {
    pool.choose(rng).copied().unwrap_or_default()
}

/// Builds a lowercase `first.last<nn>@domain` address.
pub(crate) fn email_for<R: Rng + ?Sized>(rng: &mut R, name: &str) -> String {
    let local = name
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(".");
    let suffix: u32 = rng.gen_range(1..=99);
    format!("{local}{suffix}@{}", pick(rng, EMAIL_DOMAINS))
}

/// Indian mobile number in `+91 XXXXXXXXXX` form.
pub(crate) fn phone_number<R: Rng + ?Sized>(rng: &mut R) -> String {
    let lead: u8 = rng.gen_range(6..=9);
    let rest: u64 = rng.gen_range(0..1_000_000_000);
    format!("+91 {lead}{rest:09}")
}
