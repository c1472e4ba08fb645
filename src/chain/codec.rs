// Hand-written prost mappings for the Cosmos transaction envelope and the
// four IBC message payloads this indexer persists. Field tags follow the
// upstream cosmos-sdk / ibc-go protos; prost skips unknown fields on decode,
// so fields the indexer never reads are left out of the structs.

use prost::Message;
use prost_types::Any;
use tracing::debug;

use crate::chain::models::DecodedTx;

pub const MSG_TRANSFER_URL: &str = "/ibc.applications.transfer.v1.MsgTransfer";
pub const MSG_RECV_PACKET_URL: &str = "/ibc.core.channel.v1.MsgRecvPacket";
pub const MSG_TIMEOUT_URL: &str = "/ibc.core.channel.v1.MsgTimeout";
pub const MSG_ACK_URL: &str = "/ibc.core.channel.v1.MsgAcknowledgement";

/// Router key of the transfer module.
pub const TRANSFER_ROUTE: &str = "transfer";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxRaw {
    #[prost(bytes = "vec", tag = "1")]
    pub body_bytes: Vec<u8>,
    #[prost(bytes = "vec", tag = "2")]
    pub auth_info_bytes: Vec<u8>,
    #[prost(bytes = "vec", repeated, tag = "3")]
    pub signatures: Vec<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TxBody {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<Any>,
    #[prost(string, tag = "2")]
    pub memo: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct AuthInfo {
    #[prost(message, optional, tag = "2")]
    pub fee: Option<Fee>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Fee {
    #[prost(message, repeated, tag = "1")]
    pub amount: Vec<Coin>,
    #[prost(uint64, tag = "2")]
    pub gas_limit: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Coin {
    #[prost(string, tag = "1")]
    pub denom: String,
    #[prost(string, tag = "2")]
    pub amount: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgTransfer {
    #[prost(string, tag = "1")]
    pub source_port: String,
    #[prost(string, tag = "2")]
    pub source_channel: String,
    #[prost(message, optional, tag = "3")]
    pub token: Option<Coin>,
    #[prost(string, tag = "4")]
    pub sender: String,
    #[prost(string, tag = "5")]
    pub receiver: String,
    #[prost(uint64, tag = "7")]
    pub timeout_timestamp: u64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Packet {
    #[prost(uint64, tag = "1")]
    pub sequence: u64,
    #[prost(string, tag = "2")]
    pub source_port: String,
    #[prost(string, tag = "3")]
    pub source_channel: String,
    #[prost(string, tag = "4")]
    pub destination_port: String,
    #[prost(string, tag = "5")]
    pub destination_channel: String,
    #[prost(bytes = "vec", tag = "6")]
    pub data: Vec<u8>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgRecvPacket {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<Packet>,
    #[prost(string, tag = "4")]
    pub signer: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgTimeout {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<Packet>,
    #[prost(string, tag = "5")]
    pub signer: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct MsgAcknowledgement {
    #[prost(message, optional, tag = "1")]
    pub packet: Option<Packet>,
    #[prost(string, tag = "5")]
    pub signer: String,
}

/// Decode a raw transaction into its fee and ordered message list.
pub fn decode_tx(bytes: &[u8]) -> Result<DecodedTx, prost::DecodeError> {
    let raw = TxRaw::decode(bytes)?;
    let body = TxBody::decode(raw.body_bytes.as_slice())?;
    let auth = AuthInfo::decode(raw.auth_info_bytes.as_slice())?;
    let fee = auth
        .fee
        .map(|fee| fee.amount)
        .unwrap_or_default()
        .into_iter()
        .next();
    Ok(DecodedTx {
        fee,
        messages: body.messages,
    })
}

/// The closed set of message kinds this indexer persists. Adding a fifth
/// kind means a new variant here plus one dispatch arm in the persister.
#[derive(Debug, Clone)]
pub enum MsgKind {
    Transfer(TransferMsg),
    RecvPacket(PacketMsg),
    Timeout(PacketMsg),
    Ack(PacketMsg),
    Unrecognized,
}

#[derive(Debug, Clone)]
pub struct TransferMsg {
    /// Raw account bytes recovered from the sender address, when it parses.
    pub signer: Option<Vec<u8>>,
    pub sender: String,
    pub receiver: String,
    pub amount: String,
    pub denom: String,
    pub source_channel: String,
    pub source_port: String,
    pub route: String,
}

#[derive(Debug, Clone)]
pub struct PacketMsg {
    pub signer: String,
    pub source_channel: String,
    pub destination_channel: String,
    pub source_port: String,
    pub destination_port: String,
}

/// Map a protobuf message onto the kinds the indexer knows. Unknown type
/// urls and undecodable payloads both classify as `Unrecognized`.
pub fn classify(msg: &Any) -> MsgKind {
    match msg.type_url.as_str() {
        MSG_TRANSFER_URL => match MsgTransfer::decode(msg.value.as_slice()) {
            Ok(m) => {
                let token = m.token.unwrap_or_default();
                let signer = bech32::decode(&m.sender).ok().map(|(_, data)| data);
                MsgKind::Transfer(TransferMsg {
                    signer,
                    sender: m.sender,
                    receiver: m.receiver,
                    amount: token.amount,
                    denom: token.denom,
                    source_channel: m.source_channel,
                    source_port: m.source_port,
                    route: TRANSFER_ROUTE.to_string(),
                })
            }
            Err(err) => {
                debug!("Undecodable MsgTransfer payload: {}", err);
                MsgKind::Unrecognized
            }
        },
        MSG_RECV_PACKET_URL => match MsgRecvPacket::decode(msg.value.as_slice()) {
            Ok(m) => MsgKind::RecvPacket(packet_msg(m.packet, m.signer)),
            Err(err) => {
                debug!("Undecodable MsgRecvPacket payload: {}", err);
                MsgKind::Unrecognized
            }
        },
        MSG_TIMEOUT_URL => match MsgTimeout::decode(msg.value.as_slice()) {
            Ok(m) => MsgKind::Timeout(packet_msg(m.packet, m.signer)),
            Err(err) => {
                debug!("Undecodable MsgTimeout payload: {}", err);
                MsgKind::Unrecognized
            }
        },
        MSG_ACK_URL => match MsgAcknowledgement::decode(msg.value.as_slice()) {
            Ok(m) => MsgKind::Ack(packet_msg(m.packet, m.signer)),
            Err(err) => {
                debug!("Undecodable MsgAcknowledgement payload: {}", err);
                MsgKind::Unrecognized
            }
        },
        _ => MsgKind::Unrecognized,
    }
}

fn packet_msg(packet: Option<Packet>, signer: String) -> PacketMsg {
    let packet = packet.unwrap_or_default();
    PacketMsg {
        signer,
        source_channel: packet.source_channel,
        destination_channel: packet.destination_channel,
        source_port: packet.source_port,
        destination_port: packet.destination_port,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer_any(sender: &str) -> Any {
        let msg = MsgTransfer {
            source_port: "transfer".to_string(),
            source_channel: "channel-141".to_string(),
            token: Some(Coin {
                denom: "uosmo".to_string(),
                amount: "2500".to_string(),
            }),
            sender: sender.to_string(),
            receiver: "cosmos1receiver".to_string(),
            timeout_timestamp: 0,
        };
        Any {
            type_url: MSG_TRANSFER_URL.to_string(),
            value: msg.encode_to_vec(),
        }
    }

    fn recv_packet_any() -> Any {
        let msg = MsgRecvPacket {
            packet: Some(Packet {
                sequence: 7,
                source_port: "transfer".to_string(),
                source_channel: "channel-0".to_string(),
                destination_port: "transfer".to_string(),
                destination_channel: "channel-141".to_string(),
                data: vec![1, 2, 3],
            }),
            signer: "osmo1relayer".to_string(),
        };
        Any {
            type_url: MSG_RECV_PACKET_URL.to_string(),
            value: msg.encode_to_vec(),
        }
    }

    #[test]
    fn classifies_transfer_with_fields() {
        let kind = classify(&transfer_any("osmo1sender"));
        match kind {
            MsgKind::Transfer(m) => {
                assert_eq!(m.sender, "osmo1sender");
                assert_eq!(m.receiver, "cosmos1receiver");
                assert_eq!(m.amount, "2500");
                assert_eq!(m.denom, "uosmo");
                assert_eq!(m.source_channel, "channel-141");
                assert_eq!(m.source_port, "transfer");
                assert_eq!(m.route, TRANSFER_ROUTE);
            }
            other => panic!("expected Transfer, got {:?}", other),
        }
    }

    #[test]
    fn transfer_signer_bytes_roundtrip_through_bech32() {
        let hrp = bech32::Hrp::parse("osmo").unwrap();
        let account = [7u8; 20];
        let sender = bech32::encode::<bech32::Bech32>(hrp, &account).unwrap();
        match classify(&transfer_any(&sender)) {
            MsgKind::Transfer(m) => assert_eq!(m.signer.as_deref(), Some(&account[..])),
            other => panic!("expected Transfer, got {:?}", other),
        }
    }

    #[test]
    fn classifies_packet_messages() {
        match classify(&recv_packet_any()) {
            MsgKind::RecvPacket(m) => {
                assert_eq!(m.signer, "osmo1relayer");
                assert_eq!(m.source_channel, "channel-0");
                assert_eq!(m.destination_channel, "channel-141");
                assert_eq!(m.source_port, "transfer");
                assert_eq!(m.destination_port, "transfer");
            }
            other => panic!("expected RecvPacket, got {:?}", other),
        }

        let timeout = Any {
            type_url: MSG_TIMEOUT_URL.to_string(),
            value: MsgTimeout {
                packet: Some(Packet {
                    sequence: 1,
                    source_port: "transfer".to_string(),
                    source_channel: "channel-3".to_string(),
                    destination_port: "transfer".to_string(),
                    destination_channel: "channel-9".to_string(),
                    data: vec![],
                }),
                signer: "osmo1relayer".to_string(),
            }
            .encode_to_vec(),
        };
        assert!(matches!(classify(&timeout), MsgKind::Timeout(_)));

        let ack = Any {
            type_url: MSG_ACK_URL.to_string(),
            value: MsgAcknowledgement {
                packet: None,
                signer: "osmo1relayer".to_string(),
            }
            .encode_to_vec(),
        };
        assert!(matches!(classify(&ack), MsgKind::Ack(_)));
    }

    #[test]
    fn unknown_type_url_is_unrecognized() {
        let any = Any {
            type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
            value: vec![],
        };
        assert!(matches!(classify(&any), MsgKind::Unrecognized));
    }

    #[test]
    fn undecodable_known_payload_is_unrecognized() {
        let any = Any {
            type_url: MSG_TRANSFER_URL.to_string(),
            value: vec![0xff, 0xff, 0xff],
        };
        assert!(matches!(classify(&any), MsgKind::Unrecognized));
    }

    #[test]
    fn decode_tx_yields_fee_and_messages() {
        let body = TxBody {
            messages: vec![transfer_any("osmo1sender"), recv_packet_any()],
            memo: String::new(),
        };
        let auth = AuthInfo {
            fee: Some(Fee {
                amount: vec![Coin {
                    denom: "uosmo".to_string(),
                    amount: "1250".to_string(),
                }],
                gas_limit: 200_000,
            }),
        };
        let raw = TxRaw {
            body_bytes: body.encode_to_vec(),
            auth_info_bytes: auth.encode_to_vec(),
            signatures: vec![],
        };

        let decoded = decode_tx(&raw.encode_to_vec()).unwrap();
        assert_eq!(decoded.messages.len(), 2);
        let fee = decoded.fee.as_ref().unwrap();
        assert_eq!(fee.amount, "1250");
        assert_eq!(fee.denom, "uosmo");
        assert_eq!(decoded.fee_parts(), ("1250".to_string(), "uosmo".to_string()));
    }

    #[test]
    fn decode_tx_without_fee_reports_zero() {
        let body = TxBody {
            messages: vec![],
            memo: String::new(),
        };
        let auth = AuthInfo { fee: None };
        let raw = TxRaw {
            body_bytes: body.encode_to_vec(),
            auth_info_bytes: auth.encode_to_vec(),
            signatures: vec![],
        };

        let decoded = decode_tx(&raw.encode_to_vec()).unwrap();
        assert!(decoded.fee.is_none());
        assert_eq!(decoded.fee_parts(), ("0".to_string(), String::new()));
    }

    #[test]
    fn decode_tx_rejects_garbage() {
        assert!(decode_tx(b"not-a-protobuf").is_err());
    }
}
