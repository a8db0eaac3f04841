//! Function type tags and the positional field layouts they select.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

macro_rules! func_types {
    ($($variant:ident = $code:literal => $tag:literal,)+) => {
        /// Function type as stored in `mstFunc.funcType`. Codes missing from the table
        /// are kept as [FuncType::Unknown] and decode with the default layout.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum FuncType {
            $($variant,)+
            Unknown(i32),
        }

        impl FuncType {
            pub fn from_code(code: i32) -> Self {
                match code {
                    $($code => Self::$variant,)+
                    other => Self::Unknown(other),
                }
            }

            pub fn code(self) -> i32 {
                match self {
                    $(Self::$variant => $code,)+
                    Self::Unknown(code) => code,
                }
            }

            /// camelCase tag used in API payloads and query strings.
            pub fn tag(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                    Self::Unknown(_) => "unknown",
                }
            }

            fn from_tag(tag: &str) -> Option<Self> {
                match tag {
                    $($tag => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }
    };
}

func_types! {
    None = 0 => "none",
    AddState = 1 => "addState",
    SubState = 2 => "subState",
    Damage = 3 => "damage",
    DamageNp = 4 => "damageNp",
    GainStar = 5 => "gainStar",
    GainHp = 6 => "gainHp",
    GainNp = 7 => "gainNp",
    LossNp = 8 => "lossNp",
    ShortenSkill = 9 => "shortenSkill",
    ExtendSkill = 10 => "extendSkill",
    ReleaseState = 11 => "releaseState",
    LossHp = 12 => "lossHp",
    InstantDeath = 13 => "instantDeath",
    DamageNpPierce = 14 => "damageNpPierce",
    DamageNpIndividual = 15 => "damageNpIndividual",
    AddStateShort = 16 => "addStateShort",
    GainHpPer = 17 => "gainHpPer",
    DamageNpStateIndividual = 18 => "damageNpStateIndividual",
    HastenNpturn = 19 => "hastenNpturn",
    DelayNpturn = 20 => "delayNpturn",
    DamageNpHpratioHigh = 21 => "damageNpHpratioHigh",
    DamageNpHpratioLow = 22 => "damageNpHpratioLow",
    CardReset = 23 => "cardReset",
    ReplaceMember = 24 => "replaceMember",
    LossHpSafe = 25 => "lossHpSafe",
    DamageNpCounter = 26 => "damageNpCounter",
    DamageNpStateIndividualFix = 27 => "damageNpStateIndividualFix",
    DamageNpSafe = 28 => "damageNpSafe",
    CallServant = 29 => "callServant",
    PtShuffle = 30 => "ptShuffle",
    LossStar = 31 => "lossStar",
    ChangeServant = 32 => "changeServant",
    ChangeBg = 33 => "changeBg",
    DamageValue = 34 => "damageValue",
    Withdraw = 35 => "withdraw",
    FixCommandcard = 36 => "fixCommandcard",
    ShortenBuffturn = 37 => "shortenBuffturn",
    ExtendBuffturn = 38 => "extendBuffturn",
    ShortenBuffcount = 39 => "shortenBuffcount",
    ExtendBuffcount = 40 => "extendBuffcount",
    ChangeBgm = 41 => "changeBgm",
    DisplayBuffstring = 42 => "displayBuffstring",
    Resurrection = 43 => "resurrection",
    GainNpBuffIndividualSum = 44 => "gainNpBuffIndividualSum",
    SetSystemAliveFlag = 45 => "setSystemAliveFlag",
    ForceInstantDeath = 46 => "forceInstantDeath",
    DamageNpRare = 47 => "damageNpRare",
    GainNpFromTargets = 48 => "gainNpFromTargets",
    GainHpFromTargets = 49 => "gainHpFromTargets",
    LossHpPer = 50 => "lossHpPer",
    LossHpPerSafe = 51 => "lossHpPerSafe",
    ShortenUserEquipSkill = 52 => "shortenUserEquipSkill",
    QuickChangeBg = 53 => "quickChangeBg",
    ShiftServant = 54 => "shiftServant",
    DamageNpAndCheckIndividuality = 55 => "damageNpAndCheckIndividuality",
    AbsorbNpturn = 56 => "absorbNpturn",
    OverwriteDeadType = 57 => "overwriteDeadType",
    ForceAllBuffNoact = 58 => "forceAllBuffNoact",
    BreakGaugeUp = 59 => "breakGaugeUp",
    BreakGaugeDown = 60 => "breakGaugeDown",
    MoveToLastSubmember = 61 => "moveToLastSubmember",
    ExpUp = 101 => "expUp",
    QpUp = 102 => "qpUp",
    DropUp = 103 => "dropUp",
    FriendPointUp = 104 => "friendPointUp",
    EventDropUp = 105 => "eventDropUp",
    EventDropRateUp = 106 => "eventDropRateUp",
    EventPointUp = 107 => "eventPointUp",
    EventPointRateUp = 108 => "eventPointRateUp",
    TransformServant = 109 => "transformServant",
    QpDropUp = 110 => "qpDropUp",
    ServantFriendshipUp = 111 => "servantFriendshipUp",
    UserEquipExpUp = 112 => "userEquipExpUp",
    ClassDropUp = 113 => "classDropUp",
    EnemyEncountCopyRateUp = 114 => "enemyEncountCopyRateUp",
    EnemyEncountRateUp = 115 => "enemyEncountRateUp",
    EnemyProbDown = 116 => "enemyProbDown",
    GetRewardGift = 117 => "getRewardGift",
    SendSupportFriendPoint = 118 => "sendSupportFriendPoint",
    MovePosition = 119 => "movePosition",
    Revival = 120 => "revival",
    DamageNpIndividualSum = 121 => "damageNpIndividualSum",
    DamageValueSafe = 122 => "damageValueSafe",
    FriendPointUpDuplicate = 123 => "friendPointUpDuplicate",
    MoveState = 124 => "moveState",
    ChangeBgmCostume = 125 => "changeBgmCostume",
    Func126 = 126 => "func126",
    Func127 = 127 => "func127",
    UpdateEntryPositions = 128 => "updateEntryPositions",
    BuddyPointUp = 129 => "buddyPointUp",
    AddFieldChangeToField = 130 => "addFieldChangeToField",
    SubFieldBuff = 131 => "subFieldBuff",
    EventFortificationPointUp = 132 => "eventFortificationPointUp",
    GainNpIndividualSum = 133 => "gainNpIndividualSum",
    SetQuestRouteFlag = 134 => "setQuestRouteFlag",
    LastUsePlayerSkillCopy = 135 => "lastUsePlayerSkillCopy",
    ChangeEnemyMasterFace = 136 => "changeEnemyMasterFace",
    DamageValueSafeOnce = 137 => "damageValueSafeOnce",
    AddBattleValue = 138 => "addBattleValue",
    SetBattleValue = 139 => "setBattleValue",
    GainMultiplyNp = 140 => "gainMultiplyNp",
    LossMultiplyNp = 141 => "lossMultiplyNp",
    AddBattleMissionValue = 142 => "addBattleMissionValue",
    SetBattleMissionValue = 143 => "setBattleMissionValue",
    ChangeEnemyStatusUiType = 144 => "changeEnemyStatusUiType",
    SwapFieldPosition = 145 => "swapFieldPosition",
    SetDisplayDirectBattleMessageInFsm = 146 => "setDisplayDirectBattleMessageInFsm",
    ChangeMasterFace = 147 => "changeMasterFace",
}

impl FuncType {
    /// Function types whose `vals` column holds buff ids.
    pub fn grants_buff(self) -> bool {
        matches!(
            self,
            Self::AddState | Self::AddStateShort | Self::AddFieldChangeToField
        )
    }

    /// Positional layout used to name bare integer tokens in dataVals.
    pub fn layout(self) -> FieldLayout {
        match self {
            Self::None => FieldLayout::Empty,
            Self::AddState | Self::AddStateShort | Self::AddFieldChangeToField => {
                FieldLayout::AddState
            }
            Self::SubState | Self::SubFieldBuff => FieldLayout::SubState,
            Self::DamageNpIndividual
            | Self::DamageNpStateIndividual
            | Self::DamageNpStateIndividualFix
            | Self::DamageNpIndividualSum
            | Self::DamageNpRare
            | Self::DamageNpAndCheckIndividuality
            | Self::DamageNpHpratioHigh
            | Self::DamageNpHpratioLow => FieldLayout::DamageCorrection,
            Self::GainNpFromTargets
            | Self::GainHpFromTargets
            | Self::AbsorbNpturn
            | Self::DamageValue
            | Self::DamageValueSafe
            | Self::DamageValueSafeOnce
            | Self::MoveState => FieldLayout::RateValueValue2,
            Self::GainNpBuffIndividualSum | Self::GainNpIndividualSum => {
                FieldLayout::IndividualSum
            }
            Self::TransformServant => FieldLayout::Transform,
            Self::EventDropUp
            | Self::EventDropRateUp
            | Self::EventPointUp
            | Self::EventPointRateUp
            | Self::EnemyEncountCopyRateUp
            | Self::EnemyEncountRateUp
            | Self::EventFortificationPointUp => FieldLayout::EventDrop,
            Self::ClassDropUp => FieldLayout::ClassDrop,
            Self::EnemyProbDown => FieldLayout::EnemyProbDown,
            Self::FriendPointUp | Self::FriendPointUpDuplicate => FieldLayout::FriendPoint,
            Self::ChangeBg
            | Self::ChangeBgm
            | Self::QuickChangeBg
            | Self::ChangeBgmCostume
            | Self::ChangeMasterFace
            | Self::ChangeEnemyMasterFace
            | Self::ChangeEnemyStatusUiType
            | Self::SetDisplayDirectBattleMessageInFsm
            | Self::CardReset
            | Self::PtShuffle
            | Self::Withdraw
            | Self::SetQuestRouteFlag
            | Self::UpdateEntryPositions => FieldLayout::RateValue,
            Self::Damage
            | Self::DamageNp
            | Self::GainStar
            | Self::GainHp
            | Self::GainNp
            | Self::LossNp
            | Self::ShortenSkill
            | Self::ExtendSkill
            | Self::ReleaseState
            | Self::LossHp
            | Self::InstantDeath
            | Self::DamageNpPierce
            | Self::GainHpPer
            | Self::HastenNpturn
            | Self::DelayNpturn
            | Self::ReplaceMember
            | Self::LossHpSafe
            | Self::DamageNpCounter
            | Self::DamageNpSafe
            | Self::CallServant
            | Self::LossStar
            | Self::ChangeServant
            | Self::FixCommandcard
            | Self::ShortenBuffturn
            | Self::ExtendBuffturn
            | Self::ShortenBuffcount
            | Self::ExtendBuffcount
            | Self::DisplayBuffstring
            | Self::Resurrection
            | Self::SetSystemAliveFlag
            | Self::ForceInstantDeath
            | Self::LossHpPer
            | Self::LossHpPerSafe
            | Self::ShortenUserEquipSkill
            | Self::ShiftServant
            | Self::OverwriteDeadType
            | Self::ForceAllBuffNoact
            | Self::BreakGaugeUp
            | Self::BreakGaugeDown
            | Self::MoveToLastSubmember
            | Self::ExpUp
            | Self::QpUp
            | Self::DropUp
            | Self::QpDropUp
            | Self::ServantFriendshipUp
            | Self::UserEquipExpUp
            | Self::GetRewardGift
            | Self::SendSupportFriendPoint
            | Self::MovePosition
            | Self::Revival
            | Self::Func126
            | Self::Func127
            | Self::BuddyPointUp
            | Self::LastUsePlayerSkillCopy
            | Self::AddBattleValue
            | Self::SetBattleValue
            | Self::GainMultiplyNp
            | Self::LossMultiplyNp
            | Self::AddBattleMissionValue
            | Self::SetBattleMissionValue
            | Self::SwapFieldPosition
            | Self::Unknown(_) => FieldLayout::Standard,
        }
    }
}

impl fmt::Display for FuncType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(code) => write!(f, "unknown({code})"),
            other => f.write_str(other.tag()),
        }
    }
}

/// Accepts either the camelCase tag or the numeric code.
impl FromStr for FuncType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Ok(code) = s.parse::<i32>() {
            return Ok(Self::from_code(code));
        }
        Self::from_tag(s).ok_or_else(|| format!("unknown function type '{s}'"))
    }
}

impl Serialize for FuncType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.tag())
    }
}

/// Field names assigned to bare integer tokens, by position. `None` marks a deferred slot
/// whose meaning is settled after the whole token list has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldLayout {
    Standard,
    Empty,
    AddState,
    SubState,
    DamageCorrection,
    RateValue,
    RateValueValue2,
    IndividualSum,
    Transform,
    EventDrop,
    ClassDrop,
    EnemyProbDown,
    FriendPoint,
}

/// Discriminator -> canonical name for the value held in the second deferred slot.
const DROP_BONUS_KINDS: &[(i64, &str)] = &[(1, "AddCount"), (2, "RateCount"), (3, "DropRateCount")];

impl FieldLayout {
    pub fn slots(self) -> &'static [Option<&'static str>] {
        match self {
            Self::Standard => &[Some("Rate"), Some("Value"), Some("Target")],
            Self::Empty => &[],
            Self::AddState => &[
                Some("Rate"),
                Some("Turn"),
                Some("Count"),
                Some("Value"),
                Some("UseRate"),
                Some("Value2"),
            ],
            Self::SubState => &[Some("Rate"), Some("Value"), Some("Value2")],
            Self::DamageCorrection => &[
                Some("Rate"),
                Some("Value"),
                Some("Target"),
                Some("Correction"),
            ],
            Self::RateValue => &[Some("Rate"), Some("Value")],
            Self::RateValueValue2 => &[Some("Rate"), Some("Value"), Some("Value2")],
            Self::IndividualSum => &[Some("Rate"), Some("Value"), Some("Target"), Some("Value2")],
            Self::Transform => &[
                Some("Rate"),
                Some("Value"),
                Some("Target"),
                Some("SetLimitCount"),
            ],
            Self::EventDrop => &[Some("Individuality"), None, None, Some("EventId")],
            Self::ClassDrop => &[None, None, Some("EventId")],
            Self::EnemyProbDown => &[Some("Individuality"), Some("RateCount"), Some("EventId")],
            Self::FriendPoint => &[Some("AddCount")],
        }
    }

    /// Name for a bare integer at `index`; `None` means it is stored under a temporary name.
    pub fn name_at(self, index: usize) -> Option<&'static str> {
        self.slots().get(index).copied().flatten()
    }

    /// Post-pass table for layouts with deferred slots; empty otherwise.
    pub fn deferred_names(self) -> &'static [(i64, &'static str)] {
        match self {
            Self::EventDrop | Self::ClassDrop => DROP_BONUS_KINDS,
            _ => &[],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn code_and_tag_round_trip_through_from_str() {
        assert_eq!(FuncType::from_code(1), FuncType::AddState);
        assert_eq!("addState".parse::<FuncType>(), Ok(FuncType::AddState));
        assert_eq!("113".parse::<FuncType>(), Ok(FuncType::ClassDropUp));
        assert_eq!(FuncType::ClassDropUp.tag(), "classDropUp");
        assert!("notAType".parse::<FuncType>().is_err());
    }

    #[test]
    fn unknown_codes_use_standard_layout() {
        let unknown = FuncType::from_code(9999);
        assert_eq!(unknown, FuncType::Unknown(9999));
        assert_eq!(unknown.code(), 9999);
        assert_eq!(unknown.layout(), FieldLayout::Standard);
    }

    #[test]
    fn deferred_slots_only_on_drop_layouts() {
        assert_eq!(FieldLayout::ClassDrop.name_at(0), None);
        assert_eq!(FieldLayout::ClassDrop.name_at(2), Some("EventId"));
        assert_eq!(FieldLayout::EventDrop.name_at(0), Some("Individuality"));
        assert!(FieldLayout::AddState.deferred_names().is_empty());
        assert_eq!(FieldLayout::EventDrop.deferred_names().len(), 3);
    }

    #[test]
    fn only_state_granting_types_carry_buffs() {
        assert!(FuncType::AddState.grants_buff());
        assert!(FuncType::AddStateShort.grants_buff());
        assert!(!FuncType::SubState.grants_buff());
        assert!(!FuncType::DamageNp.grants_buff());
    }
}
