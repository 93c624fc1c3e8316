//! 端口定义与掩码分解
//!
//! 所有接受多个端口的操作都以 [`PortMask`] 作为参数，内部按比特位
//! 从小到大的顺序分解为单个端口，每个端口恰好处理一次。

use crate::ProtocolError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use smallvec::SmallVec;
use std::fmt;
use std::marker::PhantomData;
use std::ops::BitOr;
use std::str::FromStr;

/// 端口家族的公共接口（电机端口 / 传感器端口）
pub trait Port: Copy + Eq + fmt::Debug + Into<u8> + 'static {
    /// 按比特位升序排列的全部端口
    const ALL: [Self; 4];

    /// 该端口对应的比特位
    #[inline]
    fn bit(self) -> u8 {
        self.into()
    }

    /// 配置文件中使用的名称（如 "PORT_B"）
    fn name(self) -> &'static str;
}

/// 电机端口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum MotorPort {
    A = 0x01,
    B = 0x02,
    C = 0x04,
    D = 0x08,
}

/// 传感器端口
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, IntoPrimitive, TryFromPrimitive)]
#[repr(u8)]
pub enum SensorPort {
    S1 = 0x01,
    S2 = 0x02,
    S3 = 0x04,
    S4 = 0x08,
}

pub const PORT_A: MotorPort = MotorPort::A;
pub const PORT_B: MotorPort = MotorPort::B;
pub const PORT_C: MotorPort = MotorPort::C;
pub const PORT_D: MotorPort = MotorPort::D;
pub const PORT_1: SensorPort = SensorPort::S1;
pub const PORT_2: SensorPort = SensorPort::S2;
pub const PORT_3: SensorPort = SensorPort::S3;
pub const PORT_4: SensorPort = SensorPort::S4;

impl Port for MotorPort {
    const ALL: [Self; 4] = [MotorPort::A, MotorPort::B, MotorPort::C, MotorPort::D];

    fn name(self) -> &'static str {
        match self {
            MotorPort::A => "PORT_A",
            MotorPort::B => "PORT_B",
            MotorPort::C => "PORT_C",
            MotorPort::D => "PORT_D",
        }
    }
}

impl Port for SensorPort {
    const ALL: [Self; 4] = [SensorPort::S1, SensorPort::S2, SensorPort::S3, SensorPort::S4];

    fn name(self) -> &'static str {
        match self {
            SensorPort::S1 => "PORT_1",
            SensorPort::S2 => "PORT_2",
            SensorPort::S3 => "PORT_3",
            SensorPort::S4 => "PORT_4",
        }
    }
}

fn parse_port<P: Port>(s: &str) -> Result<P, ProtocolError> {
    let wanted = s.trim();
    P::ALL
        .iter()
        .copied()
        .find(|p| p.name().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| ProtocolError::UnknownPortName(wanted.to_string()))
}

impl FromStr for MotorPort {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_port(s)
    }
}

impl FromStr for SensorPort {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_port(s)
    }
}

impl fmt::Display for MotorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for SensorPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(feature = "serde")]
mod serde_impl {
    //! 端口以名称字符串（"PORT_B"）序列化，便于配置文件书写
    use super::{MotorPort, Port, SensorPort};
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    macro_rules! impl_port_serde {
        ($ty:ty) => {
            impl Serialize for $ty {
                fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                    serializer.serialize_str(self.name())
                }
            }

            impl<'de> Deserialize<'de> for $ty {
                fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                    let name = String::deserialize(deserializer)?;
                    name.parse().map_err(D::Error::custom)
                }
            }
        };
    }

    impl_port_serde!(MotorPort);
    impl_port_serde!(SensorPort);
}

/// 端口掩码（多个同类端口按位或的组合）
///
/// # 示例
///
/// ```
/// use brick_protocol::{MotorPort, PORT_B, PORT_C};
///
/// let mask = PORT_B | PORT_C;
/// let ports: Vec<MotorPort> = mask.iter().collect();
/// assert_eq!(ports, vec![MotorPort::B, MotorPort::C]);
/// ```
pub struct PortMask<P: Port> {
    bits: u8,
    _port: PhantomData<P>,
}

impl<P: Port> PortMask<P> {
    /// 合法比特位（低 4 位）
    pub const VALID_BITS: u8 = 0x0F;

    /// 空掩码
    pub const fn empty() -> Self {
        Self {
            bits: 0,
            _port: PhantomData,
        }
    }

    /// 从原始比特构建，拒绝高 4 位
    pub fn from_bits(bits: u8) -> Result<Self, ProtocolError> {
        if bits & !Self::VALID_BITS != 0 {
            return Err(ProtocolError::InvalidPortMask { mask: bits });
        }
        Ok(Self {
            bits,
            _port: PhantomData,
        })
    }

    /// 原始比特值
    #[inline]
    pub fn bits(&self) -> u8 {
        self.bits
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    #[inline]
    pub fn contains(&self, port: P) -> bool {
        self.bits & port.bit() != 0
    }

    /// 按比特位升序遍历掩码中的端口
    pub fn iter(&self) -> impl Iterator<Item = P> + '_ {
        P::ALL.into_iter().filter(move |p| self.contains(*p))
    }

    /// 分解为端口列表（最多 4 个，不分配堆内存）
    pub fn ports(&self) -> SmallVec<[P; 4]> {
        self.iter().collect()
    }
}

impl<P: Port> Clone for PortMask<P> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P: Port> Copy for PortMask<P> {}

impl<P: Port> PartialEq for PortMask<P> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<P: Port> Eq for PortMask<P> {}

impl<P: Port> Default for PortMask<P> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<P: Port> fmt::Debug for PortMask<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

impl<P: Port> From<P> for PortMask<P> {
    fn from(port: P) -> Self {
        Self {
            bits: port.bit(),
            _port: PhantomData,
        }
    }
}

impl<P: Port> BitOr<P> for PortMask<P> {
    type Output = Self;

    fn bitor(self, rhs: P) -> Self {
        Self {
            bits: self.bits | rhs.bit(),
            _port: PhantomData,
        }
    }
}

impl<P: Port> BitOr for PortMask<P> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self {
            bits: self.bits | rhs.bits,
            _port: PhantomData,
        }
    }
}

impl BitOr for MotorPort {
    type Output = PortMask<MotorPort>;

    fn bitor(self, rhs: Self) -> PortMask<MotorPort> {
        PortMask::from(self) | rhs
    }
}

impl BitOr for SensorPort {
    type Output = PortMask<SensorPort>;

    fn bitor(self, rhs: Self) -> PortMask<SensorPort> {
        PortMask::from(self) | rhs
    }
}
