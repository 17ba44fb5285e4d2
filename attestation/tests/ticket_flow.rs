mod test_utils;

use attestation::{
    attestation::Attestation,
    attested::AttestedObject,
    envelope::{from_envelope, to_envelope},
    request::AttestationRequest,
    signed::SignedAttestation,
    ticket::Ticket,
    Attestable, Error, IdentifierType, KeyPair, Secret,
};
use chrono::{Duration, Utc};

const PHONE: &str = "+4512345678";

#[test]
fn ticket_is_redeemed_through_armored_objects() {
    test_utils::init_logging();
    let mut rng = test_utils::seeded_rng();
    let issuer = KeyPair::new(&mut rng);
    let organizer = KeyPair::new(&mut rng);
    let holder = KeyPair::new_low_y(&mut rng);
    let attestation_secret = Secret::new(&mut rng);
    let ticket_secret = Secret::new(&mut rng);

    // The holder sends an armored request to the issuer.
    let request = AttestationRequest::new(
        &mut rng,
        PHONE,
        IdentifierType::Phone,
        &attestation_secret,
        &holder,
    )
    .unwrap();
    let armored = to_envelope("ATTESTATION REQUEST", &request.to_der().unwrap());
    let request =
        AttestationRequest::from_der(&from_envelope("ATTESTATION REQUEST", &armored).unwrap())
            .unwrap();
    assert_eq!(request.identifier(), PHONE);

    // The issuer signs and returns an armored attestation.
    let mut attestation = Attestation::from_request(&request).unwrap();
    attestation.set_issuer(test_utils::ISSUER);
    attestation.set_serial_number(1);
    attestation.set_validity(Utc::now(), Utc::now() + Duration::days(30));
    let signed = SignedAttestation::new(attestation, &issuer).unwrap();
    let armored = to_envelope("ATTESTATION", &signed.to_der().unwrap());
    let signed = SignedAttestation::from_der(
        &from_envelope("ATTESTATION", &armored).unwrap(),
        issuer.public_key(),
    )
    .unwrap();
    assert!(signed.check_validity());
    assert_eq!(signed.attestation().subject_public_key(), holder.public_key());

    // The organizer issues a ticket to the same phone number.
    let ticket = Ticket::new(
        PHONE,
        IdentifierType::Phone,
        "6",
        48646,
        0,
        &organizer,
        &ticket_secret,
    )
    .unwrap();
    let armored = to_envelope("TICKET", &ticket.to_der().unwrap());
    let ticket = Ticket::from_der(&from_envelope("TICKET", &armored).unwrap()).unwrap();
    assert!(ticket.check_validity());

    // The holder redeems it.
    let attested = AttestedObject::new(
        &mut rng,
        ticket,
        signed,
        &holder,
        &attestation_secret,
        &ticket_secret,
    )
    .unwrap();
    let armored = to_envelope("ATTESTED TICKET", &attested.to_der().unwrap());
    let received = AttestedObject::<Ticket>::from_der(
        &from_envelope("ATTESTED TICKET", &armored).unwrap(),
        issuer.public_key(),
    )
    .unwrap();
    assert!(received.verify());
    assert!(received.check_validity());
    assert_eq!(received.attestable().ticket_id(), 48646);
    assert_eq!(received.attestable().public_key(), organizer.public_key());
}

#[test]
fn email_attestation_does_not_redeem_phone_ticket() {
    test_utils::init_logging();
    let mut rng = test_utils::seeded_rng();
    let issuer = KeyPair::new(&mut rng);
    let holder = KeyPair::new(&mut rng);
    let secret = Secret::new(&mut rng);
    let ticket_secret = Secret::new(&mut rng);

    // Same identifier string under a different type is a different identity.
    let request =
        AttestationRequest::new(&mut rng, PHONE, IdentifierType::Email, &secret, &holder).unwrap();
    let mut attestation = Attestation::from_request(&request).unwrap();
    attestation.set_issuer(test_utils::ISSUER);
    attestation.set_validity(Utc::now(), Utc::now() + Duration::days(1));
    let signed = SignedAttestation::new(attestation, &issuer).unwrap();

    let ticket = Ticket::new(
        PHONE,
        IdentifierType::Phone,
        "6",
        1,
        0,
        &issuer,
        &ticket_secret,
    )
    .unwrap();
    assert_eq!(
        AttestedObject::new(&mut rng, ticket, signed, &holder, &secret, &ticket_secret),
        Err(Error::SecretMismatch)
    );
}

#[test]
fn armor_label_must_match() {
    let armored = to_envelope("TICKET", b"\x30\x00");
    assert_eq!(
        from_envelope("CHEQUE", &armored),
        Err(Error::MalformedEncoding)
    );
}
